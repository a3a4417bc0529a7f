//! Dense and sparse univariate polynomials.
//!
//! Dense polynomials are plain coefficient vectors, lowest degree first.

use super::errors::{LigeroError, LigeroResult};
use super::field_utils::LigeroField;

/// Horner evaluation.
pub fn evaluate<F: LigeroField>(coeffs: &[F], point: F) -> F {
    let mut acc = F::zero();
    for coeff in coeffs.iter().rev() {
        acc *= point;
        acc += *coeff;
    }
    acc
}

/// Number of coefficients up to and including the leading non-zero one.
pub fn effective_len<F: LigeroField>(coeffs: &[F]) -> usize {
    coeffs
        .iter()
        .rposition(|c| !c.is_zero())
        .map_or(0, |idx| idx + 1)
}

pub fn trim<F: LigeroField>(coeffs: &mut Vec<F>) {
    let len = effective_len(coeffs);
    coeffs.truncate(len);
}

/// `lhs += scalar * rhs`, growing `lhs` if needed.
pub fn add_scaled<F: LigeroField>(lhs: &mut Vec<F>, scalar: F, rhs: &[F]) {
    if lhs.len() < rhs.len() {
        lhs.resize(rhs.len(), F::zero());
    }
    for (acc, value) in lhs.iter_mut().zip(rhs.iter()) {
        *acc += scalar * *value;
    }
}

/// Polynomial with few non-zero terms, stored as `(degree, coefficient)`
/// pairs sorted by degree. Vanishing polynomials of both domain families
/// have this shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparsePolynomial<F: LigeroField> {
    terms: Vec<(usize, F)>,
}

impl<F: LigeroField> SparsePolynomial<F> {
    pub fn from_terms(mut terms: Vec<(usize, F)>) -> Self {
        terms.retain(|(_, c)| !c.is_zero());
        terms.sort_by_key(|(deg, _)| *deg);
        let mut merged: Vec<(usize, F)> = Vec::with_capacity(terms.len());
        for (deg, coeff) in terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == deg => *acc += coeff,
                _ => merged.push((deg, coeff)),
            }
        }
        merged.retain(|(_, c)| !c.is_zero());
        Self { terms: merged }
    }

    pub fn terms(&self) -> &[(usize, F)] {
        &self.terms
    }

    pub fn degree(&self) -> usize {
        self.terms.last().map_or(0, |(deg, _)| *deg)
    }

    pub fn leading_coefficient(&self) -> F {
        self.terms.last().map_or(F::zero(), |(_, c)| *c)
    }

    pub fn evaluate(&self, point: F) -> F {
        let mut acc = F::zero();
        let mut power = F::one();
        let mut current = 0usize;
        for (deg, coeff) in &self.terms {
            power *= point.pow((deg - current) as u64);
            current = *deg;
            acc += *coeff * power;
        }
        acc
    }

    /// Formal derivative. In characteristic two only odd-degree terms survive.
    pub fn derivative(&self) -> Self {
        let terms = self
            .terms
            .iter()
            .filter(|(deg, _)| *deg > 0)
            .map(|(deg, coeff)| (deg - 1, F::from_u64(*deg as u64) * *coeff))
            .collect();
        Self::from_terms(terms)
    }

    /// `self * dense` as a dense polynomial.
    pub fn mul_dense(&self, dense: &[F]) -> Vec<F> {
        if dense.is_empty() || self.terms.is_empty() {
            return Vec::new();
        }
        let mut out = vec![F::zero(); dense.len() + self.degree()];
        for (deg, coeff) in &self.terms {
            for (i, value) in dense.iter().enumerate() {
                out[i + deg] += *coeff * *value;
            }
        }
        out
    }

    /// Long division of a dense polynomial; returns `(quotient, remainder)`
    /// with `remainder.len() == self.degree()`.
    pub fn divide(&self, dividend: &[F]) -> LigeroResult<(Vec<F>, Vec<F>)> {
        let d = self.degree();
        let lead_inv = self
            .leading_coefficient()
            .inverse()
            .ok_or_else(|| LigeroError::domain_error("division by the zero polynomial"))?;
        let mut remainder = dividend.to_vec();
        if remainder.len() < d {
            remainder.resize(d, F::zero());
            return Ok((Vec::new(), remainder));
        }
        let mut quotient = vec![F::zero(); remainder.len() - d];
        let lower = &self.terms[..self.terms.len() - 1];
        for top in (d..remainder.len()).rev() {
            let factor = remainder[top] * lead_inv;
            if factor.is_zero() {
                continue;
            }
            let shift = top - d;
            quotient[shift] = factor;
            remainder[top] = F::zero();
            for (deg, coeff) in lower {
                remainder[shift + deg] -= factor * *coeff;
            }
        }
        remainder.truncate(d);
        Ok((quotient, remainder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligero::field_gf64::Gf64;
    use crate::ligero::field_goldilocks::Goldilocks;
    use crate::ligero::field_utils::random_vector;
    use rand::{rngs::StdRng, SeedableRng};

    fn g(v: u64) -> Goldilocks {
        Goldilocks::from_u64(v)
    }

    #[test]
    fn test_horner_matches_direct_sum() {
        let coeffs = vec![g(1), g(2), g(3)];
        assert_eq!(evaluate(&coeffs, g(2)), g(1 + 4 + 12));
        assert_eq!(evaluate::<Goldilocks>(&[], g(5)), Goldilocks::zero());
    }

    #[test]
    fn test_sparse_merges_and_drops_zero_terms() {
        let p = SparsePolynomial::from_terms(vec![(3, g(1)), (0, g(2)), (3, g(4)), (1, g(0))]);
        assert_eq!(p.terms(), &[(0, g(2)), (3, g(5))]);
        assert_eq!(p.degree(), 3);
        assert_eq!(p.evaluate(g(2)), g(2 + 40));
    }

    #[test]
    fn test_division_reconstructs_dividend() {
        let mut rng = StdRng::seed_from_u64(1);
        let divisor = SparsePolynomial::from_terms(vec![(0, -g(7)), (2, g(3)), (8, g(1))]);
        let dividend: Vec<Goldilocks> = random_vector(&mut rng, 21);
        let (q, r) = divisor.divide(&dividend).unwrap();
        assert_eq!(r.len(), 8);
        let mut rebuilt = divisor.mul_dense(&q);
        add_scaled(&mut rebuilt, Goldilocks::one(), &r);
        trim(&mut rebuilt);
        let mut expected = dividend.clone();
        trim(&mut expected);
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_derivative_in_characteristic_two() {
        // (X^4 + a X^2 + b X)' = b
        let a = Gf64(0x35);
        let b = Gf64(0x9);
        let p = SparsePolynomial::from_terms(vec![(4, Gf64::one()), (2, a), (1, b)]);
        let dp = p.derivative();
        assert_eq!(dp.terms(), &[(0, b)]);
    }

    #[test]
    fn test_derivative_odd_characteristic() {
        let p = SparsePolynomial::from_terms(vec![(0, g(5)), (4, g(3))]);
        assert_eq!(p.derivative().terms(), &[(3, g(12))]);
    }
}
