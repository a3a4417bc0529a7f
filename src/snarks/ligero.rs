//! Driver entry points: build the setup for an instance, then prove or verify
//! with the Merkle oracle and the Fiat–Shamir transcript.

use crate::ligero::challenges::TRANSCRIPT_LABEL;
use crate::ligero::errors::LigeroResult;
use crate::ligero::field_utils::LigeroField;
use crate::ligero::interactive::run_interactive;
use crate::ligero::oracle::MerkleOracle;
use crate::ligero::proof::{LigeroProof, ProtocolTranscript};
use crate::ligero::prover::prove_with_source;
use crate::ligero::setup::{LigeroParameters, ProtocolSetup};
use crate::ligero::transcript::{RandomChallenges, Transcript};
use crate::ligero::verify::{verify_proof, Verdict};
use crate::snarks::r1cs::{R1cs, Witness};
use rand::Rng;

pub fn ligero_setup<F: LigeroField>(
    r1cs: &R1cs<F>,
    params: &LigeroParameters,
) -> LigeroResult<ProtocolSetup<F>> {
    ProtocolSetup::new(
        params,
        r1cs.num_variables(),
        r1cs.num_public_inputs(),
        r1cs.num_constraints(),
    )
}

pub fn ligero_prove<F: LigeroField>(
    r1cs: &R1cs<F>,
    witness: &Witness<F>,
    params: &LigeroParameters,
) -> LigeroResult<LigeroProof<F>> {
    ligero_prove_with(r1cs, witness, params, &mut rand::thread_rng())
}

/// [`ligero_prove`] with caller-supplied prover randomness.
pub fn ligero_prove_with<F: LigeroField, R: Rng + ?Sized>(
    r1cs: &R1cs<F>,
    witness: &Witness<F>,
    params: &LigeroParameters,
    rng: &mut R,
) -> LigeroResult<LigeroProof<F>> {
    // The local satisfiability check runs before any parameter derivation.
    witness.validate(r1cs)?;
    r1cs.enforce_satisfied(&witness.assignment())?;
    let setup = ligero_setup(r1cs, params)?;
    let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
    prove_with_source(
        &setup,
        &MerkleOracle::<F>::new(),
        r1cs,
        witness,
        &mut transcript,
        rng,
    )
}

pub fn ligero_verify<F: LigeroField>(
    r1cs: &R1cs<F>,
    public_input: &[F],
    proof: &LigeroProof<F>,
    params: &LigeroParameters,
) -> LigeroResult<bool> {
    Ok(ligero_verify_with(r1cs, public_input, proof, params)?.is_accept())
}

/// [`ligero_verify`] returning the reason of a rejection.
pub fn ligero_verify_with<F: LigeroField>(
    r1cs: &R1cs<F>,
    public_input: &[F],
    proof: &LigeroProof<F>,
    params: &LigeroParameters,
) -> LigeroResult<Verdict> {
    let setup = ligero_setup(r1cs, params)?;
    verify_proof(&setup, &MerkleOracle::<F>::new(), r1cs, public_input, proof)
}

/// Runs prover and verifier against each other with true verifier coins.
pub fn ligero_prove_interactive<F: LigeroField>(
    r1cs: &R1cs<F>,
    witness: &Witness<F>,
    params: &LigeroParameters,
) -> LigeroResult<(Verdict, ProtocolTranscript<F>)> {
    witness.validate(r1cs)?;
    r1cs.enforce_satisfied(&witness.assignment())?;
    let setup = ligero_setup(r1cs, params)?;
    run_interactive(
        &setup,
        &MerkleOracle::<F>::new(),
        r1cs,
        witness,
        RandomChallenges::from_entropy(),
        &mut rand::thread_rng(),
    )
}
