//! Linear checks over the committed rows.
//!
//! For a weight vector `a` over the variables and target weights `r` over
//! the constraints, the prover sends
//! `q = Σ_j â_j·ŵ_j − Σ_i r̂_i·t̂_i (+ mask)`, where `â_j`, `r̂_i` interpolate
//! the weights of row `j` / `i` over the systematic domain. Summed over `S`
//! this is `a·z − r·t`, which is zero when `t = Mz` and `a = rᵀM`.

use super::challenges::RepetitionChallenges;
use super::encoding::arrange_rows;
use super::errors::{LigeroError, LigeroResult};
use super::field_utils::{inner_product, LigeroField};
use super::polynomial::effective_len;
use super::setup::{BlindingSlot, ProtocolSetup, RowLayout};
use crate::snarks::r1cs::{ConstraintMatrix, R1cs};
use rayon::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinearFamily {
    /// `r_A·(Az − x) = 0`.
    A,
    B,
    C,
    /// `r_in·z[0..=ℓ] = r_in·(1, public)`.
    PublicInput,
}

impl LinearFamily {
    pub const ALL: [LinearFamily; 4] = [
        LinearFamily::A,
        LinearFamily::B,
        LinearFamily::C,
        LinearFamily::PublicInput,
    ];

    pub fn blinding_slot(self) -> BlindingSlot {
        match self {
            LinearFamily::A => BlindingSlot::LincheckA,
            LinearFamily::B => BlindingSlot::LincheckB,
            LinearFamily::C => BlindingSlot::LincheckC,
            LinearFamily::PublicInput => BlindingSlot::InputCheck,
        }
    }

    fn matrix(self) -> Option<ConstraintMatrix> {
        match self {
            LinearFamily::A => Some(ConstraintMatrix::A),
            LinearFamily::B => Some(ConstraintMatrix::B),
            LinearFamily::C => Some(ConstraintMatrix::C),
            LinearFamily::PublicInput => None,
        }
    }

    /// Row holding the `i`-th block of the checked product vector.
    fn target_row(self, layout: &RowLayout, i: usize) -> Option<usize> {
        match self {
            LinearFamily::A => Some(layout.x(i)),
            LinearFamily::B => Some(layout.y(i)),
            LinearFamily::C => Some(layout.w(i)),
            LinearFamily::PublicInput => None,
        }
    }

    fn challenge<F: LigeroField>(self, challenges: &RepetitionChallenges<F>) -> &[F] {
        match self {
            LinearFamily::A => &challenges.linear_a,
            LinearFamily::B => &challenges.linear_b,
            LinearFamily::C => &challenges.linear_c,
            LinearFamily::PublicInput => &challenges.input,
        }
    }
}

/// A committed row with the message-width weights applied to it.
#[derive(Clone, Debug)]
struct WeightedRow<F: LigeroField> {
    row: usize,
    weights: Vec<F>,
    negate: bool,
}

#[derive(Clone, Debug)]
pub struct LinearCheck<F: LigeroField> {
    family: LinearFamily,
    rows: Vec<WeightedRow<F>>,
    expected_sum: F,
}

impl<F: LigeroField> LinearCheck<F> {
    pub fn new(
        setup: &ProtocolSetup<F>,
        family: LinearFamily,
        r1cs: &R1cs<F>,
        challenges: &RepetitionChallenges<F>,
        public_input: &[F],
    ) -> Self {
        let config = setup.config();
        let layout = setup.layout();
        let k = config.message_width;
        let challenge = family.challenge(challenges);

        let (variable_weights, expected_sum) = match family.matrix() {
            Some(matrix) => (r1cs.combine_rows(matrix, challenge), F::zero()),
            None => {
                let mut weights = vec![F::zero(); r1cs.num_variables()];
                let width = challenge.len().min(weights.len());
                weights[..width].copy_from_slice(&challenge[..width]);
                let mut statement = Vec::with_capacity(1 + public_input.len());
                statement.push(F::one());
                statement.extend_from_slice(public_input);
                let expected = inner_product(&challenge[..width], &statement[..width]);
                (weights, expected)
            }
        };

        let mut rows = Vec::new();
        for (j, weights) in arrange_rows(&variable_weights, k, layout.witness_rows)
            .into_iter()
            .enumerate()
        {
            if weights.iter().any(|w| !w.is_zero()) {
                rows.push(WeightedRow {
                    row: layout.witness(j),
                    weights,
                    negate: false,
                });
            }
        }
        if family.matrix().is_some() {
            for (i, weights) in arrange_rows(challenge, k, layout.constraint_rows)
                .into_iter()
                .enumerate()
            {
                if let Some(row) = family.target_row(layout, i) {
                    rows.push(WeightedRow {
                        row,
                        weights,
                        negate: true,
                    });
                }
            }
        }

        Self {
            family,
            rows,
            expected_sum,
        }
    }

    pub fn family(&self) -> LinearFamily {
        self.family
    }

    /// Required value of `Σ_{ζ∈S} q(ζ)`.
    pub fn expected_sum(&self) -> F {
        self.expected_sum
    }

    /// Coefficients of `q`, computed pointwise over the codeword domain.
    pub fn prove(
        &self,
        setup: &ProtocolSetup<F>,
        codewords: &[Vec<F>],
        mask: Option<usize>,
    ) -> LigeroResult<Vec<F>> {
        let code = setup.code();
        let n = code.codeword_size();
        let mut evaluations = self
            .rows
            .par_iter()
            .try_fold(
                || vec![F::zero(); n],
                |mut acc, weighted| -> LigeroResult<Vec<F>> {
                    let extended = code.extend_row(&weighted.weights)?;
                    let codeword = &codewords[weighted.row];
                    for ((slot, weight), value) in acc.iter_mut().zip(&extended).zip(codeword) {
                        if weighted.negate {
                            *slot -= *weight * *value;
                        } else {
                            *slot += *weight * *value;
                        }
                    }
                    Ok(acc)
                },
            )
            .try_reduce(
                || vec![F::zero(); n],
                |mut lhs, rhs| {
                    for (l, r) in lhs.iter_mut().zip(rhs) {
                        *l += r;
                    }
                    Ok(lhs)
                },
            )?;
        if let Some(mask_row) = mask {
            for (slot, value) in evaluations.iter_mut().zip(&codewords[mask_row]) {
                *slot += *value;
            }
        }

        let mut coefficients = code.interpolate_codeword(&evaluations)?;
        let bound = setup.config().linear_response_len();
        if effective_len(&coefficients) > bound {
            return Err(LigeroError::protocol_error(
                "linear check",
                &format!("{:?} response exceeds degree bound", self.family),
            ));
        }
        coefficients.resize(bound, F::zero());
        Ok(coefficients)
    }

    /// Value `q(η)` must take at a queried point, from the opened column and
    /// the Lagrange coefficients of `S` at `η`.
    pub fn evaluate_at(&self, lagrange: &[F], column: &[F], mask: Option<usize>) -> F {
        let mut acc = F::zero();
        for weighted in &self.rows {
            let weight = inner_product(&weighted.weights, &lagrange[..weighted.weights.len()]);
            let term = weight * column[weighted.row];
            if weighted.negate {
                acc -= term;
            } else {
                acc += term;
            }
        }
        if let Some(mask_row) = mask {
            acc += column[mask_row];
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligero::encoding::systematic_symbols;
    use crate::ligero::field_goldilocks::Goldilocks;
    use crate::ligero::polynomial::evaluate;
    use crate::ligero::setup::LigeroParameters;
    use crate::ligero::transcript::{ChallengeSource, Transcript};
    use crate::snarks::r1cs::{LinearCombination, R1csConstraint, Witness};

    type F = Goldilocks;

    fn g(v: u64) -> F {
        F::from_u64(v)
    }

    /// `x_i * x_i = x_{i+1}` chained over a few variables, public `x_0`.
    fn squaring_chain(len: usize) -> (R1cs<F>, Witness<F>) {
        let mut values = vec![g(3)];
        for i in 0..len {
            values.push(values[i] * values[i]);
        }
        let constraints = (0..len)
            .map(|i| {
                R1csConstraint::new(
                    LinearCombination::from_terms([(i + 1, g(1))]),
                    LinearCombination::from_terms([(i + 1, g(1))]),
                    LinearCombination::from_terms([(i + 2, g(1))]),
                )
            })
            .collect();
        let r1cs = R1cs::new(len + 2, 1, constraints).unwrap();
        let witness = Witness::new(vec![values[0]], values[1..].to_vec());
        (r1cs, witness)
    }

    fn plain_rows(setup: &ProtocolSetup<F>, z: &[F], products: [&[F]; 3]) -> Vec<Vec<F>> {
        let config = setup.config();
        let layout = setup.layout();
        let k = config.message_width;
        let s = config.systematic_size();
        let mut rows = arrange_rows(z, k, layout.witness_rows);
        for product in products {
            rows.extend(arrange_rows(product, k, layout.constraint_rows));
        }
        rows.iter()
            .map(|row| {
                setup
                    .code()
                    .extend_row(&systematic_symbols(row, &[], s))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn honest_rows_sum_to_expected_and_match_columns() {
        let params = LigeroParameters::default()
            .with_zk(false)
            .with_security_level(20)
            .with_height_width_ratio(0.5);
        let (r1cs, witness) = squaring_chain(12);
        let setup = ProtocolSetup::<F>::new(&params, 14, 1, 12).unwrap();
        let z = witness.assignment();
        let (x, y, w) = r1cs.products(&z);
        let codewords = plain_rows(&setup, &z, [&x, &y, &w]);

        let mut transcript = Transcript::new(b"lincheck");
        let challenges = RepetitionChallenges {
            linear_a: transcript.challenge_vector(b"a", 12),
            linear_b: transcript.challenge_vector(b"b", 12),
            linear_c: transcript.challenge_vector(b"c", 12),
            input: transcript.challenge_vector(b"in", 2),
            quadratic: Vec::new(),
            ldt: Vec::new(),
        };

        let domain = setup.codeword_domain();
        for family in LinearFamily::ALL {
            let check = LinearCheck::new(&setup, family, &r1cs, &challenges, &witness.public);
            let q = check.prove(&setup, &codewords, None).unwrap();
            assert_eq!(q.len(), setup.config().linear_response_len());
            assert_eq!(
                setup.systematic_domain().sum_over(&q).unwrap(),
                check.expected_sum()
            );
            for position in [0, 5, domain.size() - 1] {
                let point = domain.element(position);
                let lagrange = setup.systematic_domain().lagrange_coefficients(point).unwrap();
                let column: Vec<F> = codewords.iter().map(|row| row[position]).collect();
                assert_eq!(evaluate(&q, point), check.evaluate_at(&lagrange, &column, None));
            }
        }
    }

    #[test]
    fn forged_products_break_the_sum() {
        let params = LigeroParameters::default()
            .with_zk(false)
            .with_security_level(20)
            .with_height_width_ratio(0.5);
        let (r1cs, witness) = squaring_chain(6);
        let setup = ProtocolSetup::<F>::new(&params, 8, 1, 6).unwrap();
        let z = witness.assignment();
        let (mut x, y, w) = r1cs.products(&z);
        x[2] += g(1);
        let codewords = plain_rows(&setup, &z, [&x, &y, &w]);

        let mut transcript = Transcript::new(b"lincheck");
        let challenges = RepetitionChallenges {
            linear_a: transcript.challenge_vector(b"a", 6),
            linear_b: transcript.challenge_vector(b"b", 6),
            linear_c: transcript.challenge_vector(b"c", 6),
            input: transcript.challenge_vector(b"in", 2),
            quadratic: Vec::new(),
            ldt: Vec::new(),
        };
        let check = LinearCheck::new(&setup, LinearFamily::A, &r1cs, &challenges, &witness.public);
        let q = check.prove(&setup, &codewords, None).unwrap();
        assert_ne!(setup.systematic_domain().sum_over(&q).unwrap(), F::zero());
    }
}
