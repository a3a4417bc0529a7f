//! Ligero-style Interactive Oracle Proof for R1CS
//!
//! The prover encodes the witness and the `Az`, `Bz`, `Cz` vectors as rows of
//! an interleaved Reed–Solomon codeword, commits to its columns and answers
//! random linear, quadratic and low-degree challenges. Module layout:
//! - fields: `field_utils`, `field_goldilocks`, `field_gf64`, `field_bn254`
//! - transforms: `polynomial`, `fft`, `domain`, `encoding`
//! - commitments and randomness: `merkle`, `oracle`, `transcript`, `challenges`
//! - protocol: `setup`, `lincheck`, `rowcheck`, `ldt`, `prover`, `verify`,
//!   `interactive`, `proof`

pub mod challenges;
pub mod domain;
pub mod encoding;
pub mod errors;
pub mod fft;
pub mod field_bn254;
pub mod field_gf64;
pub mod field_goldilocks;
pub mod field_serde;
pub mod field_utils;
pub mod interactive;
pub mod ldt;
pub mod lincheck;
pub mod merkle;
pub mod oracle;
pub mod polynomial;
pub mod proof;
pub mod prover;
pub mod rowcheck;
pub mod setup;
pub mod transcript;
pub mod verify;


pub use domain::{DomainType, EvaluationDomain};
pub use errors::{LigeroError, LigeroResult};
pub use field_gf64::Gf64;
pub use field_goldilocks::Goldilocks;
pub use field_utils::LigeroField;
pub use interactive::run_interactive;
pub use oracle::{ColumnOpening, MerkleOracle, Oracle};
pub use proof::{LigeroProof, ProtocolTranscript, RepetitionResponse, TranscriptEntry};
pub use prover::{prove_with_source, LigeroProver};
pub use setup::{LdtReducerSoundnessType, LigeroParameters, ProtocolConfig, ProtocolSetup};
pub use transcript::{ChallengeSource, MerlinChallenges, RandomChallenges, Transcript};
pub use verify::{verify_proof, LigeroVerifier, RejectReason, Verdict, VerifierState};
