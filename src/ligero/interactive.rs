//! Interactive execution: the verifier sends true random coins and every
//! message is recorded in a [`ProtocolTranscript`].

use super::errors::LigeroResult;
use super::field_utils::LigeroField;
use super::oracle::Oracle;
use super::proof::{ProtocolTranscript, TranscriptEntry};
use super::prover::LigeroProver;
use super::setup::ProtocolSetup;
use super::transcript::ChallengeSource;
use super::verify::{LigeroVerifier, Verdict};
use crate::snarks::r1cs::{R1cs, Witness};
use rand::Rng;
use tracing::debug;

pub fn run_interactive<F, O, C, R>(
    setup: &ProtocolSetup<F>,
    oracle: &O,
    r1cs: &R1cs<F>,
    witness: &Witness<F>,
    verifier_coins: C,
    prover_rng: &mut R,
) -> LigeroResult<(Verdict, ProtocolTranscript<F>)>
where
    F: LigeroField,
    O: Oracle<F>,
    C: ChallengeSource,
    R: Rng + ?Sized,
{
    let prover = LigeroProver::new(setup, oracle, r1cs, witness, prover_rng)?;
    let mut verifier = LigeroVerifier::new(setup, oracle, r1cs, &witness.public, verifier_coins)?;
    let mut transcript = ProtocolTranscript::new();

    let root = prover.commitment();
    transcript.record(TranscriptEntry::Commitment { root });
    verifier.receive_commitment(root)?;

    let challenges = verifier.issue_challenges()?;
    transcript.record(TranscriptEntry::Challenges(challenges.clone()));

    let responses = prover.respond(&challenges)?;
    transcript.record(TranscriptEntry::Responses(responses.clone()));
    let positions = verifier.receive_responses(responses)?;
    transcript.record(TranscriptEntry::QueryPositions(positions.clone()));

    let openings = prover.open(&positions)?;
    let verdict = verifier.receive_openings(&openings)?;
    transcript.record(TranscriptEntry::Openings(openings));

    debug!(messages = transcript.len(), ?verdict, "Interactive run finished");
    Ok((verdict, transcript))
}
