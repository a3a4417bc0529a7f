//! Transforms between coefficient and evaluation form.
//!
//! Multiplicative cosets use the radix-2 Cooley–Tukey FFT. Affine subspaces
//! of a binary field use the subspace-polynomial additive FFT: the domain is
//! split along its top basis vector, where the subspace polynomial of the
//! remaining basis is constant on each half.

use super::errors::{LigeroError, LigeroResult};
use super::field_utils::LigeroField;

fn ensure_power_of_two(len: usize) -> LigeroResult<()> {
    if len == 0 {
        return Err(LigeroError::domain_error("FFT length must be > 0"));
    }
    if !len.is_power_of_two() {
        return Err(LigeroError::domain_error("FFT length must be a power of two"));
    }
    Ok(())
}

fn validate_generator<F: LigeroField>(root: F, domain_size: usize) -> LigeroResult<()> {
    let n = domain_size as u64;
    if root.pow(n) != F::one() {
        return Err(LigeroError::domain_error("root^n != 1 in FFT domain"));
    }
    if domain_size > 1 && root.pow(n / 2) == F::one() {
        return Err(LigeroError::domain_error(
            "root does not have full order for FFT domain",
        ));
    }
    Ok(())
}

fn bit_reverse_permutation<F>(values: &mut [F]) {
    let n = values.len();
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            values.swap(i, j);
        }
    }
}

pub fn fft_in_place<F: LigeroField>(values: &mut [F], root: F) -> LigeroResult<()> {
    ensure_power_of_two(values.len())?;
    validate_generator(root, values.len())?;

    bit_reverse_permutation(values);

    let n = values.len();
    let mut len = 2;
    while len <= n {
        let w_len = root.pow((n / len) as u64);
        let half = len / 2;
        for i in (0..n).step_by(len) {
            let mut w = F::one();
            for j in 0..half {
                let u = values[i + j];
                let t = values[i + j + half] * w;
                values[i + j] = u + t;
                values[i + j + half] = u - t;
                w *= w_len;
            }
        }
        len <<= 1;
    }
    Ok(())
}

pub fn ifft_in_place<F: LigeroField>(values: &mut [F], root: F) -> LigeroResult<()> {
    ensure_power_of_two(values.len())?;
    let inv_root = root
        .inverse()
        .ok_or_else(|| LigeroError::domain_error("FFT root has no inverse"))?;
    fft_in_place(values, inv_root)?;

    let inv_n = F::from_u64(values.len() as u64)
        .inverse()
        .ok_or_else(|| LigeroError::domain_error("FFT length is zero in the field"))?;
    for value in values.iter_mut() {
        *value *= inv_n;
    }
    Ok(())
}

/// Evaluations of `coeffs` at `shift * generator^i`. `coeffs` may be shorter
/// than the domain.
pub fn evaluate_on_coset<F: LigeroField>(
    coeffs: &[F],
    shift: F,
    generator: F,
    domain_size: usize,
) -> LigeroResult<Vec<F>> {
    ensure_power_of_two(domain_size)?;
    if coeffs.len() > domain_size {
        return Err(LigeroError::domain_error(
            "polynomial does not fit the evaluation domain",
        ));
    }
    let mut scaled = vec![F::zero(); domain_size];
    let mut shift_power = F::one();
    for (slot, coeff) in scaled.iter_mut().zip(coeffs.iter()) {
        *slot = *coeff * shift_power;
        shift_power *= shift;
    }
    fft_in_place(&mut scaled, generator)?;
    Ok(scaled)
}

pub fn interpolate_on_coset<F: LigeroField>(
    evaluations: &[F],
    shift: F,
    generator: F,
) -> LigeroResult<Vec<F>> {
    ensure_power_of_two(evaluations.len())?;
    let shift_inv = shift
        .inverse()
        .ok_or_else(|| LigeroError::domain_error("coset shift must be non-zero"))?;

    let mut spectrum = evaluations.to_vec();
    ifft_in_place(&mut spectrum, generator)?;

    let mut power = F::one();
    for value in spectrum.iter_mut() {
        *value *= power;
        power *= shift_inv;
    }
    Ok(spectrum)
}

/// Subspace polynomials `Z_j` of the nested spans `<b_0, ..., b_{j-1}>`, in
/// linearized form: `Z_j(X) = sum_k c[j][k] * X^(2^k)`.
#[derive(Clone, Debug)]
pub struct SubspacePolynomials<F: LigeroField> {
    basis: Vec<F>,
    linearized: Vec<Vec<F>>,
}

impl<F: LigeroField> SubspacePolynomials<F> {
    /// `Z_0 = X`, `Z_{j+1} = Z_j^2 - Z_j(b_j) * Z_j`.
    pub fn new(basis: &[F]) -> LigeroResult<Self> {
        if !F::CHARACTERISTIC_TWO {
            return Err(LigeroError::domain_error(
                "affine subspace domains need a field of characteristic two",
            ));
        }
        let mut linearized = Vec::with_capacity(basis.len() + 1);
        linearized.push(vec![F::one()]);
        for (j, b) in basis.iter().enumerate() {
            let current = &linearized[j];
            let at_b = evaluate_linearized(current, *b);
            if at_b.is_zero() {
                return Err(LigeroError::domain_error(
                    "subspace basis is not linearly independent",
                ));
            }
            let mut next = vec![F::zero(); current.len() + 1];
            for (k, coeff) in current.iter().enumerate() {
                next[k + 1] += coeff.square();
                next[k] -= at_b * *coeff;
            }
            linearized.push(next);
        }
        Ok(Self {
            basis: basis.to_vec(),
            linearized,
        })
    }

    pub fn basis(&self) -> &[F] {
        &self.basis
    }

    pub fn dimension(&self) -> usize {
        self.basis.len()
    }

    /// Linearized coefficients of `Z_j`.
    pub fn linearized(&self, j: usize) -> &[F] {
        &self.linearized[j]
    }

    pub fn evaluate(&self, j: usize, point: F) -> F {
        evaluate_linearized(&self.linearized[j], point)
    }

    /// `(degree, coefficient)` terms of `Z_j` as an ordinary polynomial.
    pub fn terms(&self, j: usize) -> Vec<(usize, F)> {
        self.linearized[j]
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(k, c)| (1usize << k, *c))
            .collect()
    }
}

fn evaluate_linearized<F: LigeroField>(coeffs: &[F], point: F) -> F {
    let mut acc = F::zero();
    let mut frobenius = point;
    for coeff in coeffs {
        acc += *coeff * frobenius;
        frobenius = frobenius.square();
    }
    acc
}

/// Divides by the monic `Z_j` (degree `2^j`) in place: on return
/// `values[..half]` holds the remainder and `values[half..]` the quotient.
fn divide_by_subspace_poly<F: LigeroField>(values: &mut [F], terms: &[(usize, F)]) {
    let half = values.len() / 2;
    for top in (half..values.len()).rev() {
        let factor = values[top];
        if factor.is_zero() {
            continue;
        }
        let shift = top - half;
        for (deg, coeff) in terms.iter().filter(|(deg, _)| *deg < half) {
            values[shift + deg] -= factor * *coeff;
        }
    }
}

/// Inverse of [`divide_by_subspace_poly`].
fn multiply_by_subspace_poly<F: LigeroField>(values: &mut [F], terms: &[(usize, F)]) {
    let half = values.len() / 2;
    for top in half..values.len() {
        let factor = values[top];
        if factor.is_zero() {
            continue;
        }
        let shift = top - half;
        for (deg, coeff) in terms.iter().filter(|(deg, _)| *deg < half) {
            values[shift + deg] += factor * *coeff;
        }
    }
}

/// Evaluations of `coeffs` at `shift + sum_j bit_j(i) * b_j` for
/// `i in 0..2^dim`.
pub fn additive_fft<F: LigeroField>(
    coeffs: &[F],
    shift: F,
    polys: &SubspacePolynomials<F>,
) -> LigeroResult<Vec<F>> {
    let size = 1usize << polys.dimension();
    if coeffs.len() > size {
        return Err(LigeroError::domain_error(
            "polynomial does not fit the evaluation domain",
        ));
    }
    let mut values = vec![F::zero(); size];
    values[..coeffs.len()].copy_from_slice(coeffs);
    additive_fft_rec(&mut values, shift, polys.dimension(), polys);
    Ok(values)
}

fn additive_fft_rec<F: LigeroField>(
    values: &mut [F],
    shift: F,
    dim: usize,
    polys: &SubspacePolynomials<F>,
) {
    if dim == 0 {
        return;
    }
    let j = dim - 1;
    let top = polys.basis[j];
    let terms = polys.terms(j);
    divide_by_subspace_poly(values, &terms);

    // Z_j is constant on each half of the domain.
    let c0 = polys.evaluate(j, shift);
    let c1 = c0 + polys.evaluate(j, top);
    let half = values.len() / 2;
    let (lo, hi) = values.split_at_mut(half);
    for (r, q) in lo.iter_mut().zip(hi.iter_mut()) {
        let quotient = *q;
        *q = *r + c1 * quotient;
        *r += c0 * quotient;
    }
    additive_fft_rec(lo, shift, j, polys);
    additive_fft_rec(hi, shift + top, j, polys);
}

/// Inverse of [`additive_fft`].
pub fn additive_ifft<F: LigeroField>(
    evaluations: &[F],
    shift: F,
    polys: &SubspacePolynomials<F>,
) -> LigeroResult<Vec<F>> {
    let size = 1usize << polys.dimension();
    if evaluations.len() != size {
        return Err(LigeroError::domain_error(
            "evaluation count does not match the domain size",
        ));
    }
    let mut values = evaluations.to_vec();
    additive_ifft_rec(&mut values, shift, polys.dimension(), polys)?;
    Ok(values)
}

fn additive_ifft_rec<F: LigeroField>(
    values: &mut [F],
    shift: F,
    dim: usize,
    polys: &SubspacePolynomials<F>,
) -> LigeroResult<()> {
    if dim == 0 {
        return Ok(());
    }
    let j = dim - 1;
    let top = polys.basis[j];
    let half = values.len() / 2;
    {
        let (lo, hi) = values.split_at_mut(half);
        additive_ifft_rec(lo, shift, j, polys)?;
        additive_ifft_rec(hi, shift + top, j, polys)?;
    }

    let c0 = polys.evaluate(j, shift);
    let gap = polys.evaluate(j, top);
    let gap_inv = gap
        .inverse()
        .ok_or_else(|| LigeroError::domain_error("degenerate subspace basis"))?;
    let (lo, hi) = values.split_at_mut(half);
    for (p0, p1) in lo.iter_mut().zip(hi.iter_mut()) {
        let quotient = (*p1 - *p0) * gap_inv;
        *p0 -= c0 * quotient;
        *p1 = quotient;
    }
    multiply_by_subspace_poly(values, &polys.terms(j));
    Ok(())
}
