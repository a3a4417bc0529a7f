//! Ligero prover: row encoding, commitment and per-repetition responses.

use super::challenges::{
    absorb_commitment, absorb_responses, bind_statement, draw_query_positions,
    draw_repetition_challenges, RepetitionChallenges,
};
use super::encoding::{arrange_rows, systematic_symbols};
use super::errors::{LigeroError, LigeroResult};
use super::field_utils::{random_vector, LigeroField};
use super::ldt::prove_ldt_combination;
use super::lincheck::{LinearCheck, LinearFamily};
use super::merkle::Digest32;
use super::oracle::{ColumnOpening, Oracle};
use super::proof::{LigeroProof, RepetitionResponse};
use super::rowcheck::prove_quadratic_check;
use super::setup::{BlindingSlot, ProtocolSetup};
use super::transcript::ChallengeSource;
use crate::snarks::r1cs::{R1cs, Witness};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

/// A prover that has committed to its rows and answers challenges.
pub struct LigeroProver<'a, F: LigeroField, O: Oracle<F>> {
    setup: &'a ProtocolSetup<F>,
    oracle: &'a O,
    r1cs: &'a R1cs<F>,
    public_input: Vec<F>,
    /// Coefficients of every committed row, in layout order.
    row_coefficients: Vec<Vec<F>>,
    handle: O::Handle,
}

impl<'a, F: LigeroField, O: Oracle<F>> LigeroProver<'a, F, O> {
    /// Checks the witness locally, then encodes and commits. An unsatisfied
    /// instance is never encoded.
    pub fn new<R: Rng + ?Sized>(
        setup: &'a ProtocolSetup<F>,
        oracle: &'a O,
        r1cs: &'a R1cs<F>,
        witness: &Witness<F>,
        rng: &mut R,
    ) -> LigeroResult<Self> {
        check_shape(setup, r1cs)?;
        witness.validate(r1cs)?;
        let z = witness.assignment();
        r1cs.enforce_satisfied(&z)?;
        let (x, y, w) = r1cs.products(&z);
        Self::from_vectors(setup, oracle, r1cs, &witness.public, z, x, y, w, rng)
    }

    /// Commits to arbitrary `z`, `x`, `y`, `w` without checking them.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_vectors<R: Rng + ?Sized>(
        setup: &'a ProtocolSetup<F>,
        oracle: &'a O,
        r1cs: &'a R1cs<F>,
        public_input: &[F],
        z: Vec<F>,
        x: Vec<F>,
        y: Vec<F>,
        w: Vec<F>,
        rng: &mut R,
    ) -> LigeroResult<Self> {
        let config = setup.config();
        let layout = setup.layout();
        let k = config.message_width;
        let s = config.systematic_size();
        let padding = config.zk_padding;

        let mut symbols = Vec::with_capacity(layout.base_rows());
        for row in arrange_rows(&z, k, layout.witness_rows) {
            let pad: Vec<F> = random_vector(rng, padding);
            symbols.push(systematic_symbols(&row, &pad, s));
        }
        let x_pads: Vec<Vec<F>> = (0..layout.constraint_rows)
            .map(|_| random_vector(rng, padding))
            .collect();
        let y_pads: Vec<Vec<F>> = (0..layout.constraint_rows)
            .map(|_| random_vector(rng, padding))
            .collect();
        // The w padding is the product of the x and y padding, so the
        // Hadamard relation also holds on the padded positions.
        let w_pads: Vec<Vec<F>> = x_pads
            .iter()
            .zip(&y_pads)
            .map(|(px, py)| px.iter().zip(py).map(|(a, b)| *a * *b).collect())
            .collect();
        for (values, pads) in [(&x, &x_pads), (&y, &y_pads), (&w, &w_pads)] {
            for (row, pad) in arrange_rows(values, k, layout.constraint_rows)
                .iter()
                .zip(pads.iter())
            {
                symbols.push(systematic_symbols(row, pad, s));
            }
        }

        let encoded = setup.code().encode_rows(&symbols)?;
        let mut row_coefficients = Vec::with_capacity(layout.total_rows());
        let mut codewords = Vec::with_capacity(layout.total_rows());
        for row in encoded {
            row_coefficients.push(row.coefficients);
            codewords.push(row.evaluations);
        }

        if layout.zk {
            let masks = blinding_polynomials(setup, rng)?;
            let encoded_masks = masks
                .par_iter()
                .map(|coeffs| setup.code().encode_polynomial(coeffs))
                .collect::<LigeroResult<Vec<_>>>()?;
            for row in encoded_masks {
                row_coefficients.push(row.coefficients);
                codewords.push(row.evaluations);
            }
        }

        let handle = oracle.commit(codewords)?;
        debug!(
            rows = layout.total_rows(),
            witness_rows = layout.witness_rows,
            constraint_rows = layout.constraint_rows,
            "Prover committed to encoded rows"
        );
        Ok(Self {
            setup,
            oracle,
            r1cs,
            public_input: public_input.to_vec(),
            row_coefficients,
            handle,
        })
    }

    pub fn commitment(&self) -> Digest32 {
        self.oracle.root(&self.handle)
    }

    /// One response per repetition, computed in parallel.
    pub fn respond(
        &self,
        challenges: &[RepetitionChallenges<F>],
    ) -> LigeroResult<Vec<RepetitionResponse<F>>> {
        if challenges.len() != self.setup.config().repetitions {
            return Err(LigeroError::protocol_error(
                "respond",
                &format!(
                    "expected {} challenge sets, got {}",
                    self.setup.config().repetitions,
                    challenges.len()
                ),
            ));
        }
        challenges
            .par_iter()
            .enumerate()
            .map(|(repetition, challenge)| self.respond_repetition(repetition, challenge))
            .collect()
    }

    fn respond_repetition(
        &self,
        repetition: usize,
        challenges: &RepetitionChallenges<F>,
    ) -> LigeroResult<RepetitionResponse<F>> {
        let setup = self.setup;
        let layout = setup.layout();
        let codewords = self.oracle.codewords(&self.handle);
        let linear = |family: LinearFamily| {
            LinearCheck::new(setup, family, self.r1cs, challenges, &self.public_input).prove(
                setup,
                codewords,
                layout.blinding(repetition, family.blinding_slot()),
            )
        };
        Ok(RepetitionResponse {
            linear_a: linear(LinearFamily::A)?,
            linear_b: linear(LinearFamily::B)?,
            linear_c: linear(LinearFamily::C)?,
            input: linear(LinearFamily::PublicInput)?,
            quadratic_quotient: prove_quadratic_check(
                setup,
                codewords,
                &challenges.quadratic,
                layout.blinding(repetition, BlindingSlot::Quadcheck),
            )?,
            ldt_combination: prove_ldt_combination(
                layout,
                &self.row_coefficients,
                &challenges.ldt,
                layout.blinding(repetition, BlindingSlot::Ldt),
                setup.config().ldt_response_len(),
            )?,
        })
    }

    /// Column openings at the given positions.
    pub fn open(&self, positions: &[usize]) -> LigeroResult<Vec<ColumnOpening<F>>> {
        self.oracle.open_many(&self.handle, positions)
    }
}

pub(crate) fn check_shape<F: LigeroField>(
    setup: &ProtocolSetup<F>,
    r1cs: &R1cs<F>,
) -> LigeroResult<()> {
    let config = setup.config();
    if config.num_variables != r1cs.num_variables()
        || config.num_constraints != r1cs.num_constraints()
        || config.num_public_inputs != r1cs.num_public_inputs()
    {
        return Err(LigeroError::invalid_parameters(
            "protocol setup was derived for a different constraint system shape",
        ));
    }
    Ok(())
}

/// Blinding rows for every repetition, in [`BlindingSlot::ALL`] order.
fn blinding_polynomials<F: LigeroField, R: Rng + ?Sized>(
    setup: &ProtocolSetup<F>,
    rng: &mut R,
) -> LigeroResult<Vec<Vec<F>>> {
    let config = setup.config();
    let mut masks = Vec::with_capacity(config.repetitions * BlindingSlot::ALL.len());
    for _ in 0..config.repetitions {
        for slot in BlindingSlot::ALL {
            let mask = match slot {
                BlindingSlot::LincheckA
                | BlindingSlot::LincheckB
                | BlindingSlot::LincheckC
                | BlindingSlot::InputCheck => sum_zero_mask(setup, rng)?,
                BlindingSlot::Quadcheck => vanishing_mask(setup, rng),
                BlindingSlot::Ldt => random_vector(rng, config.systematic_size()),
            };
            masks.push(mask);
        }
    }
    Ok(masks)
}

/// Degree `< 2s − 1`, summing to zero over `S`.
fn sum_zero_mask<F: LigeroField, R: Rng + ?Sized>(
    setup: &ProtocolSetup<F>,
    rng: &mut R,
) -> LigeroResult<Vec<F>> {
    let s = setup.config().systematic_size();
    let mut values: Vec<F> = random_vector(rng, s);
    let mut total = F::zero();
    for value in &values[..s - 1] {
        total += *value;
    }
    values[s - 1] = -total;
    let mut coefficients = setup.systematic_domain().ifft(&values)?;
    coefficients.resize(setup.config().linear_response_len(), F::zero());
    for (acc, value) in coefficients.iter_mut().zip(vanishing_mask(setup, rng)) {
        *acc += value;
    }
    Ok(coefficients)
}

/// `Z_S · g` with `deg g < s − 1`.
fn vanishing_mask<F: LigeroField, R: Rng + ?Sized>(setup: &ProtocolSetup<F>, rng: &mut R) -> Vec<F> {
    let s = setup.config().systematic_size();
    let factor: Vec<F> = random_vector(rng, s - 1);
    setup.systematic_domain().vanishing_polynomial().mul_dense(&factor)
}

/// Non-interactive proof: every verifier message is squeezed from `source`.
pub fn prove_with_source<F, O, C, R>(
    setup: &ProtocolSetup<F>,
    oracle: &O,
    r1cs: &R1cs<F>,
    witness: &Witness<F>,
    source: &mut C,
    rng: &mut R,
) -> LigeroResult<LigeroProof<F>>
where
    F: LigeroField,
    O: Oracle<F>,
    C: ChallengeSource,
    R: Rng + ?Sized,
{
    let prover = LigeroProver::new(setup, oracle, r1cs, witness, rng)?;
    prove_committed(&prover, setup, r1cs, &witness.public, source)
}

pub(crate) fn prove_committed<F, O, C>(
    prover: &LigeroProver<'_, F, O>,
    setup: &ProtocolSetup<F>,
    r1cs: &R1cs<F>,
    public_input: &[F],
    source: &mut C,
) -> LigeroResult<LigeroProof<F>>
where
    F: LigeroField,
    O: Oracle<F>,
    C: ChallengeSource,
{
    bind_statement(source, &r1cs.digest(), public_input, setup.parameters());
    let commitment = prover.commitment();
    absorb_commitment(source, &commitment);
    let challenges = draw_repetition_challenges(source, setup.config());
    let repetitions = prover.respond(&challenges)?;
    absorb_responses(source, &repetitions);
    let positions = draw_query_positions(source, setup.config());
    let openings = prover.open(&positions)?;
    info!(
        repetitions = repetitions.len(),
        openings = openings.len(),
        "Ligero proof generated"
    );
    Ok(LigeroProof {
        parameters: setup.parameters().clone(),
        commitment,
        repetitions,
        openings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligero::field_goldilocks::Goldilocks;
    use crate::ligero::oracle::MerkleOracle;
    use crate::ligero::setup::LigeroParameters;
    use crate::snarks::r1cs::{LinearCombination, R1csConstraint};
    use rand::{rngs::StdRng, SeedableRng};

    type F = Goldilocks;

    fn square_instance() -> R1cs<F> {
        let x = LinearCombination::from_terms([(2, F::one())]);
        let out = LinearCombination::from_terms([(1, F::one())]);
        R1cs::new(3, 1, vec![R1csConstraint::new(x.clone(), x, out)]).unwrap()
    }

    #[test]
    fn masks_have_the_required_structure() {
        let params = LigeroParameters::default().with_security_level(20);
        let setup = ProtocolSetup::<F>::new(&params, 3, 1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let s_domain = setup.systematic_domain();

        let lin = sum_zero_mask(&setup, &mut rng).unwrap();
        assert_eq!(lin.len(), setup.config().linear_response_len());
        assert_eq!(s_domain.sum_over(&lin).unwrap(), F::zero());

        let quad = vanishing_mask(&setup, &mut rng);
        let (_, remainder) = s_domain.vanishing_polynomial().divide(&quad).unwrap();
        assert!(remainder.iter().all(|c| c.is_zero()));

        let masks = blinding_polynomials(&setup, &mut rng).unwrap();
        assert_eq!(masks.len(), setup.config().repetitions * 6);
    }

    #[test]
    fn unsatisfied_witness_is_never_committed() {
        let params = LigeroParameters::default().with_security_level(20);
        let r1cs = square_instance();
        let setup = ProtocolSetup::<F>::new(&params, 3, 1, 1).unwrap();
        let oracle = MerkleOracle::<F>::new();
        let witness = Witness::new(vec![F::from_u64(9)], vec![F::from_u64(4)]);
        let err = LigeroProver::new(&setup, &oracle, &r1cs, &witness, &mut StdRng::seed_from_u64(1))
            .err()
            .unwrap();
        assert!(matches!(err, LigeroError::UnsatisfiedConstraint { index: 0 }));
    }

    #[test]
    fn shape_mismatch_is_a_parameter_error() {
        let params = LigeroParameters::default().with_security_level(20);
        let r1cs = square_instance();
        let setup = ProtocolSetup::<F>::new(&params, 5, 1, 2).unwrap();
        let oracle = MerkleOracle::<F>::new();
        let witness = Witness::new(vec![F::from_u64(9)], vec![F::from_u64(3)]);
        let result = LigeroProver::new(&setup, &oracle, &r1cs, &witness, &mut StdRng::seed_from_u64(1));
        assert!(matches!(
            result.err().unwrap(),
            LigeroError::InvalidParameters { .. }
        ));
    }

    #[test]
    fn responses_have_fixed_lengths() {
        let params = LigeroParameters::default().with_security_level(20);
        let r1cs = square_instance();
        let setup = ProtocolSetup::<F>::new(&params, 3, 1, 1).unwrap();
        let oracle = MerkleOracle::<F>::new();
        let witness = Witness::new(vec![F::from_u64(9)], vec![F::from_u64(3)]);
        let mut transcript = crate::ligero::transcript::Transcript::new(b"prover-test");
        let proof = prove_with_source(
            &setup,
            &oracle,
            &r1cs,
            &witness,
            &mut transcript,
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();
        let config = setup.config();
        assert_eq!(proof.repetitions.len(), config.repetitions);
        for response in &proof.repetitions {
            assert_eq!(response.linear_a.len(), config.linear_response_len());
            assert_eq!(response.input.len(), config.linear_response_len());
            assert_eq!(response.quadratic_quotient.len(), config.quotient_len());
            assert_eq!(response.ldt_combination.len(), config.ldt_response_len());
        }
        for opening in &proof.openings {
            assert_eq!(opening.values.len(), config.layout.total_rows());
        }
    }
}
