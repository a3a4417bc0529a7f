//! Proof objects and their byte / JSON encodings.

use super::challenges::RepetitionChallenges;
use super::errors::{LigeroError, LigeroResult};
use super::field_serde;
use super::field_utils::LigeroField;
use super::merkle::Digest32;
use super::oracle::ColumnOpening;
use super::setup::LigeroParameters;
use bincode::Options;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, IfIsHumanReadable};

/// Prover message for one LDT repetition. Every polynomial is sent as
/// coefficients over the monomial basis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionResponse<F: LigeroField> {
    #[serde(with = "field_serde::vec")]
    pub linear_a: Vec<F>,
    #[serde(with = "field_serde::vec")]
    pub linear_b: Vec<F>,
    #[serde(with = "field_serde::vec")]
    pub linear_c: Vec<F>,
    #[serde(with = "field_serde::vec")]
    pub input: Vec<F>,
    /// `h` with `Σ ρ_i (x̂_i ŷ_i − ŵ_i) + mask = Z_S · h`.
    #[serde(with = "field_serde::vec")]
    pub quadratic_quotient: Vec<F>,
    /// Coefficients of the combined codeword `u`.
    #[serde(with = "field_serde::vec")]
    pub ldt_combination: Vec<F>,
}

impl<F: LigeroField> RepetitionResponse<F> {
    pub(crate) fn labelled_parts(&self) -> [(&'static [u8], &[F]); 6] {
        [
            (&b"linear_a"[..], self.linear_a.as_slice()),
            (&b"linear_b"[..], self.linear_b.as_slice()),
            (&b"linear_c"[..], self.linear_c.as_slice()),
            (&b"input"[..], self.input.as_slice()),
            (&b"quadratic_quotient"[..], self.quadratic_quotient.as_slice()),
            (&b"ldt_combination"[..], self.ldt_combination.as_slice()),
        ]
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct LigeroProof<F: LigeroField> {
    pub parameters: LigeroParameters,
    #[serde_as(as = "IfIsHumanReadable<Hex>")]
    pub commitment: Digest32,
    pub repetitions: Vec<RepetitionResponse<F>>,
    /// One column per distinct query position, in increasing order.
    pub openings: Vec<ColumnOpening<F>>,
}

impl<F: LigeroField> LigeroProof<F> {
    pub fn to_bytes(&self) -> LigeroResult<Vec<u8>> {
        bincode_options()
            .serialize(self)
            .map_err(|e| LigeroError::serialization_error(&e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> LigeroResult<Self> {
        Ok(bincode_options().deserialize(bytes)?)
    }

    pub fn to_json(&self) -> LigeroResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LigeroError::serialization_error(&e.to_string()))
    }

    pub fn from_json(text: &str) -> LigeroResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn size_in_bytes(&self) -> LigeroResult<usize> {
        Ok(bincode_options().serialized_size(self)? as usize)
    }
}

/// One message of an interactive run, in protocol order.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "snake_case")]
pub enum TranscriptEntry<F: LigeroField> {
    Commitment {
        #[serde_as(as = "IfIsHumanReadable<Hex>")]
        root: Digest32,
    },
    Challenges(Vec<RepetitionChallenges<F>>),
    Responses(Vec<RepetitionResponse<F>>),
    QueryPositions(Vec<usize>),
    Openings(Vec<ColumnOpening<F>>),
}

impl<F: LigeroField> TranscriptEntry<F> {
    pub fn is_prover_message(&self) -> bool {
        matches!(
            self,
            TranscriptEntry::Commitment { .. }
                | TranscriptEntry::Responses(_)
                | TranscriptEntry::Openings(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ProtocolTranscript<F: LigeroField> {
    pub entries: Vec<TranscriptEntry<F>>,
}

impl<F: LigeroField> ProtocolTranscript<F> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: TranscriptEntry<F>) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reassembles the non-interactive proof object from a finished run.
    pub fn to_proof(&self, parameters: &LigeroParameters) -> Option<LigeroProof<F>> {
        let mut commitment = None;
        let mut repetitions = None;
        let mut openings = None;
        for entry in &self.entries {
            match entry {
                TranscriptEntry::Commitment { root } => commitment = Some(*root),
                TranscriptEntry::Responses(r) => repetitions = Some(r.clone()),
                TranscriptEntry::Openings(o) => openings = Some(o.clone()),
                TranscriptEntry::Challenges(_) | TranscriptEntry::QueryPositions(_) => {}
            }
        }
        Some(LigeroProof {
            parameters: parameters.clone(),
            commitment: commitment?,
            repetitions: repetitions?,
            openings: openings?,
        })
    }
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}
