//! Systematic Reed–Solomon code over a pair of evaluation domains.
//!
//! A message row of `k` symbols is padded to `s` symbols, read as the
//! evaluations of a polynomial of degree `< s` over the systematic domain
//! `S`, and extended to the codeword domain `L` (`|L| = n`).

use super::domain::EvaluationDomain;
use super::errors::{LigeroError, LigeroResult};
use super::field_utils::LigeroField;
use super::polynomial::effective_len;
use rayon::prelude::*;

/// A committed row in both representations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedRow<F: LigeroField> {
    pub coefficients: Vec<F>,
    pub evaluations: Vec<F>,
}

#[derive(Debug)]
pub struct ReedSolomonCode<F: LigeroField> {
    systematic: EvaluationDomain<F>,
    codeword: EvaluationDomain<F>,
    message_width: usize,
}

impl<F: LigeroField> ReedSolomonCode<F> {
    pub fn new(
        systematic: EvaluationDomain<F>,
        codeword: EvaluationDomain<F>,
        message_width: usize,
    ) -> LigeroResult<Self> {
        if codeword.size() < 2 * systematic.size() {
            return Err(LigeroError::invalid_parameters(
                "codeword domain must be at least twice the systematic domain",
            ));
        }
        if message_width == 0 || message_width > systematic.size() {
            return Err(LigeroError::invalid_parameters(
                "message width must be in 1..=systematic domain size",
            ));
        }
        if codeword.contains(systematic.element(0)) {
            return Err(LigeroError::domain_error(
                "systematic and codeword domains intersect",
            ));
        }
        Ok(Self {
            systematic,
            codeword,
            message_width,
        })
    }

    pub fn systematic_domain(&self) -> &EvaluationDomain<F> {
        &self.systematic
    }

    pub fn codeword_domain(&self) -> &EvaluationDomain<F> {
        &self.codeword
    }

    pub fn message_width(&self) -> usize {
        self.message_width
    }

    pub fn systematic_size(&self) -> usize {
        self.systematic.size()
    }

    pub fn codeword_size(&self) -> usize {
        self.codeword.size()
    }

    pub fn rate(&self) -> f64 {
        self.systematic_size() as f64 / self.codeword_size() as f64
    }

    /// Coefficients of the polynomial of degree `< s` taking `symbols` on
    /// the first points of `S` and zero on the rest.
    pub fn interpolate_row(&self, symbols: &[F]) -> LigeroResult<Vec<F>> {
        let s = self.systematic_size();
        if symbols.len() > s {
            return Err(LigeroError::protocol_error(
                "encode",
                "row is longer than the systematic domain",
            ));
        }
        let mut padded = symbols.to_vec();
        padded.resize(s, F::zero());
        self.systematic.ifft(&padded)
    }

    pub fn encode_systematic(&self, symbols: &[F]) -> LigeroResult<EncodedRow<F>> {
        let coefficients = self.interpolate_row(symbols)?;
        let evaluations = self.codeword.fft(&coefficients)?;
        Ok(EncodedRow {
            coefficients,
            evaluations,
        })
    }

    /// Codeword evaluations only; used for public rows the verifier never sees.
    pub fn extend_row(&self, symbols: &[F]) -> LigeroResult<Vec<F>> {
        let coefficients = self.interpolate_row(symbols)?;
        self.codeword.fft(&coefficients)
    }

    pub fn encode_polynomial(&self, coeffs: &[F]) -> LigeroResult<EncodedRow<F>> {
        let evaluations = self.codeword.fft(coeffs)?;
        Ok(EncodedRow {
            coefficients: coeffs.to_vec(),
            evaluations,
        })
    }

    pub fn encode_rows(&self, rows: &[Vec<F>]) -> LigeroResult<Vec<EncodedRow<F>>> {
        rows.par_iter()
            .map(|row| self.encode_systematic(row))
            .collect()
    }

    pub fn interpolate_codeword(&self, codeword: &[F]) -> LigeroResult<Vec<F>> {
        self.codeword.ifft(codeword)
    }

    /// Recovers the `k` message symbols of an exact codeword.
    pub fn decode(&self, codeword: &[F]) -> LigeroResult<Vec<F>> {
        let mut coefficients = self.interpolate_codeword(codeword)?;
        let s = self.systematic_size();
        if effective_len(&coefficients) > s {
            return Err(LigeroError::protocol_error(
                "decode",
                "word is not a codeword of the systematic code",
            ));
        }
        coefficients.truncate(s);
        let mut symbols = self.systematic.fft(&coefficients)?;
        symbols.truncate(self.message_width);
        Ok(symbols)
    }
}

/// Lays `values` out row-major in `rows x width`, zero filled.
pub fn arrange_rows<F: LigeroField>(values: &[F], width: usize, rows: usize) -> Vec<Vec<F>> {
    let mut out = vec![vec![F::zero(); width]; rows];
    for (idx, value) in values.iter().enumerate().take(width * rows) {
        out[idx / width][idx % width] = *value;
    }
    out
}

/// Appends `padding` to a message row and zero fills to `size`.
pub fn systematic_symbols<F: LigeroField>(message: &[F], padding: &[F], size: usize) -> Vec<F> {
    let mut symbols = Vec::with_capacity(size);
    symbols.extend_from_slice(message);
    symbols.extend_from_slice(padding);
    symbols.resize(size, F::zero());
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligero::field_gf64::Gf64;
    use crate::ligero::field_goldilocks::Goldilocks;
    use crate::ligero::field_utils::random_vector;
    use crate::ligero::polynomial::evaluate;
    use rand::{rngs::StdRng, SeedableRng};

    fn goldilocks_code() -> ReedSolomonCode<Goldilocks> {
        let s = EvaluationDomain::new_coset(3, Goldilocks::one()).unwrap();
        let l =
            EvaluationDomain::new_coset(5, Goldilocks::multiplicative_generator().unwrap()).unwrap();
        ReedSolomonCode::new(s, l, 6).unwrap()
    }

    fn binary_code() -> ReedSolomonCode<Gf64> {
        let basis = Gf64::subspace_basis(6).unwrap();
        let s = EvaluationDomain::new_subspace(&basis[..3], Gf64::zero()).unwrap();
        let l = EvaluationDomain::new_subspace(&basis[..5], basis[5]).unwrap();
        ReedSolomonCode::new(s, l, 5).unwrap()
    }

    fn check_systematic<F: LigeroField>(code: &ReedSolomonCode<F>, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let message: Vec<F> = random_vector(&mut rng, code.message_width());
        let padding: Vec<F> = random_vector(&mut rng, 2);
        let symbols = systematic_symbols(&message, &padding, code.systematic_size());
        let row = code.encode_systematic(&symbols).unwrap();
        assert_eq!(row.evaluations.len(), code.codeword_size());
        for (i, point) in code.codeword_domain().elements().iter().enumerate() {
            assert_eq!(row.evaluations[i], evaluate(&row.coefficients, *point));
        }
        for (i, point) in code.systematic_domain().elements().iter().enumerate() {
            assert_eq!(evaluate(&row.coefficients, *point), symbols[i]);
        }
        assert_eq!(code.decode(&row.evaluations).unwrap(), message);
    }

    #[test]
    fn encoding_is_systematic_over_both_domain_types() {
        check_systematic(&goldilocks_code(), 1);
        check_systematic(&binary_code(), 2);
    }

    #[test]
    fn decode_rejects_corrupted_word() {
        let code = goldilocks_code();
        let mut row = code.encode_systematic(&[Goldilocks::from_u64(5)]).unwrap();
        row.evaluations[3] += Goldilocks::one();
        assert!(code.decode(&row.evaluations).is_err());
    }

    #[test]
    fn rows_are_row_major() {
        let values: Vec<Goldilocks> = (1..=5).map(Goldilocks::from_u64).collect();
        let rows = arrange_rows(&values, 2, 3);
        assert_eq!(rows[0], vec![Goldilocks::from_u64(1), Goldilocks::from_u64(2)]);
        assert_eq!(rows[2], vec![Goldilocks::from_u64(5), Goldilocks::zero()]);
    }

    #[test]
    fn rejects_undersized_codeword_domain() {
        let s = EvaluationDomain::new_coset(3, Goldilocks::one()).unwrap();
        let l = EvaluationDomain::new_coset(3, Goldilocks::from_u64(7)).unwrap();
        assert!(ReedSolomonCode::new(s, l, 4).is_err());
    }
}
