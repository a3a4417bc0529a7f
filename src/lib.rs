//! Ligero-R1CS: a Ligero-style Interactive Oracle Proof for Rank-1 Constraint Systems
//!
//! This library provides two layers:
//!
//! 1. **ligero**: the IOP itself. Fields, Reed–Solomon encoding, column
//!    commitments, Fiat–Shamir challenges, the prover and the verifier state machine.
//! 2. **snarks**: the R1CS front-end, constraint-file loader, arkworks import
//!    and one-call prove / verify drivers.
//!
//! ```rust
//! use ligero_r1cs::{ligero_prove, ligero_verify, Goldilocks, LigeroField, LigeroParameters};
//! use ligero_r1cs::snarks::{LinearCombination, R1cs, R1csConstraint, Witness};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! // x * x = out, with `out` public
//! let x = LinearCombination::from_terms([(2, Goldilocks::one())]);
//! let out = LinearCombination::from_terms([(1, Goldilocks::one())]);
//! let r1cs = R1cs::new(3, 1, vec![R1csConstraint::new(x.clone(), x, out)])?;
//! let witness = Witness::new(vec![Goldilocks::from_u64(9)], vec![Goldilocks::from_u64(3)]);
//!
//! let params = LigeroParameters::default().with_security_level(40);
//! let proof = ligero_prove(&r1cs, &witness, &params)?;
//! assert!(ligero_verify(&r1cs, &witness.public, &proof, &params)?);
//! # Ok(())
//! # }
//! ```

pub mod ligero;
pub mod snarks;

// Re-export commonly used types for convenience
pub use ligero::{
    Gf64, Goldilocks, LigeroError, LigeroField, LigeroParameters, LigeroProof, LigeroResult,
    RejectReason, Verdict,
};

pub use snarks::{ligero_prove, ligero_verify, R1cs, Witness};
