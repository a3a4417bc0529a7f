//! Import of `ark-relations` constraint systems.
//!
//! arkworks orders variables as `(1, instance..., witness...)`, the same
//! layout [`R1cs`] uses, so matrix columns map onto variable indices as-is.

use crate::ligero::errors::{LigeroError, LigeroResult};
use crate::ligero::field_utils::LigeroField;
use crate::snarks::r1cs::{LinearCombination, R1cs, R1csConstraint, Witness};
use ark_ff::PrimeField;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, ConstraintSystemRef};
use tracing::debug;

fn row<F: LigeroField>(entries: &[(F, usize)]) -> LinearCombination<F> {
    LinearCombination::from_terms(entries.iter().map(|&(coeff, var)| (var, coeff)))
}

/// Converts a synthesized constraint system and its assignment.
///
/// The system is finalized first so that inlined linear combinations are
/// expanded into the matrices.
pub fn import_constraint_system<F>(
    cs: &ConstraintSystemRef<F>,
) -> LigeroResult<(R1cs<F>, Witness<F>)>
where
    F: LigeroField + PrimeField,
{
    cs.finalize();
    let matrices = cs.to_matrices().ok_or_else(|| {
        LigeroError::format_error("constraint system was synthesized without matrices")
    })?;
    let system = cs
        .borrow()
        .ok_or_else(|| LigeroError::format_error("constraint system is not initialised"))?;

    if system.instance_assignment.len() != matrices.num_instance_variables
        || system.witness_assignment.len() != matrices.num_witness_variables
    {
        return Err(LigeroError::format_error(
            "constraint system carries no complete assignment",
        ));
    }

    let constraints: Vec<R1csConstraint<F>> = matrices
        .a
        .iter()
        .zip(matrices.b.iter())
        .zip(matrices.c.iter())
        .map(|((a, b), c)| R1csConstraint::new(row(a), row(b), row(c)))
        .collect();

    let num_public = matrices.num_instance_variables.saturating_sub(1);
    let r1cs = R1cs::new(
        matrices.num_instance_variables + matrices.num_witness_variables,
        num_public,
        constraints,
    )?;
    let witness = Witness::new(
        system.instance_assignment.iter().skip(1).copied().collect(),
        system.witness_assignment.clone(),
    );
    debug!(
        variables = r1cs.num_variables(),
        public = num_public,
        constraints = r1cs.num_constraints(),
        "Imported arkworks constraint system"
    );
    Ok((r1cs, witness))
}

/// Synthesizes `circuit` into a fresh constraint system and imports it.
pub fn import_circuit<F, C>(circuit: C) -> LigeroResult<(R1cs<F>, Witness<F>)>
where
    F: LigeroField + PrimeField,
    C: ConstraintSynthesizer<F>,
{
    let cs = ConstraintSystem::<F>::new_ref();
    circuit
        .generate_constraints(cs.clone())
        .map_err(|err| LigeroError::format_error(&format!("synthesis failed: {err}")))?;
    import_constraint_system(&cs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_relations::lc;
    use ark_relations::r1cs::{SynthesisError, Variable};

    /// `x^3 + x + 5 = out`
    struct Cubic {
        x: Fr,
    }

    impl ConstraintSynthesizer<Fr> for Cubic {
        fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
            let x_value = self.x;
            let x_sq_value = x_value * x_value;
            let out_value = x_sq_value * x_value + x_value + Fr::from(5u64);

            let out = cs.new_input_variable(|| Ok(out_value))?;
            let x = cs.new_witness_variable(|| Ok(x_value))?;
            let x_sq = cs.new_witness_variable(|| Ok(x_sq_value))?;
            let x_cube = cs.new_witness_variable(|| Ok(x_sq_value * x_value))?;

            cs.enforce_constraint(lc!() + x, lc!() + x, lc!() + x_sq)?;
            cs.enforce_constraint(lc!() + x_sq, lc!() + x, lc!() + x_cube)?;
            cs.enforce_constraint(
                lc!() + x_cube + x + (Fr::from(5u64), Variable::One),
                lc!() + Variable::One,
                lc!() + out,
            )?;
            Ok(())
        }
    }

    #[test]
    fn imports_cubic_circuit() {
        let (r1cs, witness) = import_circuit(Cubic { x: Fr::from(3u64) }).unwrap();
        assert_eq!(r1cs.num_public_inputs(), 1);
        assert_eq!(r1cs.num_private_inputs(), 3);
        assert_eq!(r1cs.num_constraints(), 3);
        assert_eq!(witness.public, vec![Fr::from(35u64)]);
        assert!(r1cs.is_satisfied(&witness.assignment()));
    }

    #[test]
    fn tampered_assignment_is_detected() {
        let (r1cs, mut witness) = import_circuit(Cubic { x: Fr::from(2u64) }).unwrap();
        witness.public[0] += Fr::from(1u64);
        assert_eq!(
            r1cs.enforce_satisfied(&witness.assignment()),
            Err(LigeroError::unsatisfied(2))
        );
    }

    #[test]
    fn setup_mode_without_assignment_is_rejected() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        cs.set_mode(ark_relations::r1cs::SynthesisMode::Setup);
        Cubic { x: Fr::from(1u64) }
            .generate_constraints(cs.clone())
            .unwrap();
        assert!(matches!(
            import_constraint_system(&cs),
            Err(LigeroError::FormatError { .. })
        ));
    }
}
