//! Evaluation domains: multiplicative cosets and affine binary subspaces.

use super::errors::{LigeroError, LigeroResult};
use super::fft::{
    additive_fft, additive_ifft, evaluate_on_coset, interpolate_on_coset, SubspacePolynomials,
};
use super::field_utils::{batch_inverse, LigeroField};
use super::polynomial::SparsePolynomial;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainType {
    MultiplicativeCoset,
    AffineSubspace,
}

impl DomainType {
    pub fn supported_by<F: LigeroField>(self) -> bool {
        match self {
            DomainType::MultiplicativeCoset => !F::CHARACTERISTIC_TWO && F::TWO_ADICITY > 0,
            DomainType::AffineSubspace => F::CHARACTERISTIC_TWO,
        }
    }
}

#[derive(Clone, Debug)]
enum Shape<F: LigeroField> {
    Coset { offset: F, generator: F },
    Subspace { shift: F, polys: SubspacePolynomials<F> },
}

/// A domain of `2^log_size` points. Elements, the vanishing polynomial and
/// the inverses of its derivative on the domain are computed on first use.
#[derive(Debug)]
pub struct EvaluationDomain<F: LigeroField> {
    log_size: usize,
    shape: Shape<F>,
    elements: OnceCell<Vec<F>>,
    vanishing: OnceCell<SparsePolynomial<F>>,
    derivative_inverses: OnceCell<Vec<F>>,
}

impl<F: LigeroField> EvaluationDomain<F> {
    /// `offset * <omega>` with `omega` of order `2^log_size`.
    pub fn new_coset(log_size: usize, offset: F) -> LigeroResult<Self> {
        if F::CHARACTERISTIC_TWO {
            return Err(LigeroError::domain_error(
                "multiplicative cosets need a field of odd characteristic",
            ));
        }
        if offset.is_zero() {
            return Err(LigeroError::domain_error("coset offset must be non-zero"));
        }
        let generator = u32::try_from(log_size)
            .ok()
            .and_then(F::root_of_unity)
            .ok_or_else(|| {
                LigeroError::domain_error(&format!(
                    "{} has no subgroup of size 2^{}",
                    F::NAME,
                    log_size
                ))
            })?;
        Ok(Self::with_shape(log_size, Shape::Coset { offset, generator }))
    }

    /// `shift + span(basis)`.
    pub fn new_subspace(basis: &[F], shift: F) -> LigeroResult<Self> {
        let polys = SubspacePolynomials::new(basis)?;
        Ok(Self::with_shape(basis.len(), Shape::Subspace { shift, polys }))
    }

    fn with_shape(log_size: usize, shape: Shape<F>) -> Self {
        Self {
            log_size,
            shape,
            elements: OnceCell::new(),
            vanishing: OnceCell::new(),
            derivative_inverses: OnceCell::new(),
        }
    }

    pub fn size(&self) -> usize {
        1 << self.log_size
    }

    pub fn log_size(&self) -> usize {
        self.log_size
    }

    pub fn domain_type(&self) -> DomainType {
        match self.shape {
            Shape::Coset { .. } => DomainType::MultiplicativeCoset,
            Shape::Subspace { .. } => DomainType::AffineSubspace,
        }
    }

    pub fn elements(&self) -> &[F] {
        self.elements.get_or_init(|| match &self.shape {
            Shape::Coset { offset, generator } => {
                let mut out = Vec::with_capacity(self.size());
                let mut point = *offset;
                for _ in 0..self.size() {
                    out.push(point);
                    point *= *generator;
                }
                out
            }
            Shape::Subspace { shift, polys } => {
                let mut out = vec![*shift; self.size()];
                for (bit, b) in polys.basis().iter().enumerate() {
                    for (i, point) in out.iter_mut().enumerate() {
                        if (i >> bit) & 1 == 1 {
                            *point += *b;
                        }
                    }
                }
                out
            }
        })
    }

    pub fn element(&self, index: usize) -> F {
        self.elements()[index]
    }

    /// Evaluates a polynomial of fewer than `size()` coefficients on the domain.
    pub fn fft(&self, coeffs: &[F]) -> LigeroResult<Vec<F>> {
        match &self.shape {
            Shape::Coset { offset, generator } => {
                evaluate_on_coset(coeffs, *offset, *generator, self.size())
            }
            Shape::Subspace { shift, polys } => additive_fft(coeffs, *shift, polys),
        }
    }

    /// Coefficients of the unique polynomial of degree `< size()` through `evaluations`.
    pub fn ifft(&self, evaluations: &[F]) -> LigeroResult<Vec<F>> {
        if evaluations.len() != self.size() {
            return Err(LigeroError::domain_error(&format!(
                "expected {} evaluations, got {}",
                self.size(),
                evaluations.len()
            )));
        }
        match &self.shape {
            Shape::Coset { offset, generator } => {
                interpolate_on_coset(evaluations, *offset, *generator)
            }
            Shape::Subspace { shift, polys } => additive_ifft(evaluations, *shift, polys),
        }
    }

    /// `X^s - offset^s` for a coset, `Z_V(X) - Z_V(shift)` for a subspace.
    pub fn vanishing_polynomial(&self) -> &SparsePolynomial<F> {
        self.vanishing.get_or_init(|| match &self.shape {
            Shape::Coset { offset, .. } => SparsePolynomial::from_terms(vec![
                (self.size(), F::one()),
                (0, -offset.pow(self.size() as u64)),
            ]),
            Shape::Subspace { shift, polys } => {
                let mut terms = polys.terms(self.log_size);
                terms.push((0, -polys.evaluate(self.log_size, *shift)));
                SparsePolynomial::from_terms(terms)
            }
        })
    }

    pub fn evaluate_vanishing(&self, point: F) -> F {
        match &self.shape {
            Shape::Coset { offset, .. } => {
                let s = self.size() as u64;
                point.pow(s) - offset.pow(s)
            }
            Shape::Subspace { shift, polys } => {
                polys.evaluate(self.log_size, point) - polys.evaluate(self.log_size, *shift)
            }
        }
    }

    fn derivative_inverses(&self) -> LigeroResult<&[F]> {
        if let Some(cached) = self.derivative_inverses.get() {
            return Ok(cached);
        }
        let derivative = self.vanishing_polynomial().derivative();
        let values: Vec<F> = self
            .elements()
            .iter()
            .map(|x| derivative.evaluate(*x))
            .collect();
        let inverses = batch_inverse(&values)?;
        Ok(self.derivative_inverses.get_or_init(|| inverses))
    }

    /// Values `L_i(point)` of the Lagrange basis of this domain.
    pub fn lagrange_coefficients(&self, point: F) -> LigeroResult<Vec<F>> {
        let elements = self.elements();
        if let Some(idx) = elements.iter().position(|x| *x == point) {
            let mut unit = vec![F::zero(); self.size()];
            unit[idx] = F::one();
            return Ok(unit);
        }
        let z = self.evaluate_vanishing(point);
        let differences: Vec<F> = elements.iter().map(|x| point - *x).collect();
        let inv_differences = batch_inverse(&differences)?;
        let derivative_inverses = self.derivative_inverses()?;
        Ok(inv_differences
            .iter()
            .zip(derivative_inverses.iter())
            .map(|(inv_diff, inv_deriv)| z * *inv_diff * *inv_deriv)
            .collect())
    }

    /// `sum_{x in domain} p(x)` for a polynomial of any degree.
    pub fn sum_over(&self, coeffs: &[F]) -> LigeroResult<F> {
        let (_, remainder) = self.vanishing_polynomial().divide(coeffs)?;
        let evaluations = self.fft(&remainder)?;
        let mut acc = F::zero();
        for value in evaluations {
            acc += value;
        }
        Ok(acc)
    }

    pub fn contains(&self, point: F) -> bool {
        self.evaluate_vanishing(point).is_zero()
    }
}
