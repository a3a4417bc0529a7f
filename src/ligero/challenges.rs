//! Message schedule shared by prover and verifier.
//!
//! Both sides drive a [`ChallengeSource`] through the same absorb / squeeze
//! sequence, so a Fiat–Shamir proof replays exactly the challenges an
//! interactive verifier would have sent.

use super::field_serde;
use super::field_utils::{serialize_field_slice, LigeroField};
use super::merkle::Digest32;
use super::proof::RepetitionResponse;
use super::setup::{LigeroParameters, ProtocolConfig};
use super::transcript::ChallengeSource;
use serde::{Deserialize, Serialize};

pub const TRANSCRIPT_LABEL: &[u8] = b"ligero_r1cs";

/// Verifier coins for one LDT repetition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionChallenges<F: LigeroField> {
    /// `r_A`, one weight per constraint.
    #[serde(with = "field_serde::vec")]
    pub linear_a: Vec<F>,
    #[serde(with = "field_serde::vec")]
    pub linear_b: Vec<F>,
    #[serde(with = "field_serde::vec")]
    pub linear_c: Vec<F>,
    /// `r_in`, one weight per position `0..=ℓ` of `z`.
    #[serde(with = "field_serde::vec")]
    pub input: Vec<F>,
    /// `ρ`, one coefficient per `Az` row.
    #[serde(with = "field_serde::vec")]
    pub quadratic: Vec<F>,
    /// `γ`, one coefficient per tested row.
    #[serde(with = "field_serde::vec")]
    pub ldt: Vec<F>,
}

/// Round 0: the statement, the public input and the parameters.
pub fn bind_statement<F: LigeroField, C: ChallengeSource>(
    source: &mut C,
    r1cs_digest: &Digest32,
    public_input: &[F],
    parameters: &LigeroParameters,
) {
    source.absorb(b"field", F::NAME.as_bytes());
    source.absorb(b"r1cs", r1cs_digest);
    source.absorb(b"public_input", &serialize_field_slice(public_input));
    source.absorb(b"parameters", &parameters.transcript_bytes());
}

pub fn absorb_commitment<C: ChallengeSource>(source: &mut C, root: &Digest32) {
    source.absorb(b"commitment", root);
}

pub fn draw_repetition_challenges<F: LigeroField, C: ChallengeSource>(
    source: &mut C,
    config: &ProtocolConfig,
) -> Vec<RepetitionChallenges<F>> {
    let constraints = config.num_constraints;
    (0..config.repetitions)
        .map(|repetition| {
            source.absorb(b"repetition", &(repetition as u64).to_le_bytes());
            RepetitionChallenges {
                linear_a: source.challenge_vector(b"linear_a", constraints),
                linear_b: source.challenge_vector(b"linear_b", constraints),
                linear_c: source.challenge_vector(b"linear_c", constraints),
                input: source.challenge_vector(b"input", config.num_public_inputs + 1),
                quadratic: source.challenge_vector(b"quadratic", config.layout.constraint_rows),
                ldt: source.challenge_vector(b"ldt", config.layout.ldt_combination_len()),
            }
        })
        .collect()
}

/// Every response vector is absorbed with its length, so a malformed
/// response cannot collide with a well-formed one.
pub fn absorb_responses<F: LigeroField, C: ChallengeSource>(
    source: &mut C,
    responses: &[RepetitionResponse<F>],
) {
    source.absorb(b"response_count", &(responses.len() as u64).to_le_bytes());
    for response in responses {
        for (label, values) in response.labelled_parts() {
            source.absorb(label, &(values.len() as u64).to_le_bytes());
            source.absorb(label, &serialize_field_slice(values));
        }
    }
}

/// Query positions over the codeword domain, sorted and distinct.
pub fn draw_query_positions<C: ChallengeSource>(
    source: &mut C,
    config: &ProtocolConfig,
) -> Vec<usize> {
    source.challenge_positions(b"queries", config.query_count, config.codeword_size())
}
