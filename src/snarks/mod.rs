//! R1CS front-end and drivers for the Ligero IOP.
//!
//! - [`r1cs`]: constraint systems, assignments and the satisfiability check.
//! - [`loader`]: JSON-lines constraint files and their `.in` assignments.
//! - [`arkworks`]: import of `ark-relations` constraint systems.
//! - [`ligero`]: one-call prove / verify entry points.

pub mod arkworks;
pub mod ligero;
pub mod loader;
pub mod r1cs;

pub use arkworks::{import_circuit, import_constraint_system};
pub use ligero::{
    ligero_prove, ligero_prove_interactive, ligero_prove_with, ligero_setup, ligero_verify,
    ligero_verify_with,
};
pub use loader::{default_inputs_path, load_inputs, load_instance, load_r1cs, R1csHeader};
pub use r1cs::{LinearCombination, R1cs, R1csConstraint, Satisfaction, Witness};
