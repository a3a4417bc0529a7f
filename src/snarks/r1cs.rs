use crate::ligero::errors::{LigeroError, LigeroResult};
use crate::ligero::field_utils::LigeroField;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Index into the full assignment `z`; variable 0 is the constant 1.
pub type Variable = usize;

/// Sparse linear combination with unique variables and no zero coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearCombination<F: LigeroField> {
    terms: BTreeMap<Variable, F>,
}

impl<F: LigeroField> LinearCombination<F> {
    pub fn new() -> Self {
        Self {
            terms: BTreeMap::new(),
        }
    }

    /// Repeated variables are summed.
    pub fn from_terms<I: IntoIterator<Item = (Variable, F)>>(terms: I) -> Self {
        let mut lc = Self::new();
        for (variable, coefficient) in terms {
            lc.add_term(variable, coefficient);
        }
        lc
    }

    pub fn add_term(&mut self, variable: Variable, coefficient: F) {
        let entry = self.terms.entry(variable).or_insert_with(F::zero);
        *entry += coefficient;
        if entry.is_zero() {
            self.terms.remove(&variable);
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (Variable, F)> + '_ {
        self.terms.iter().map(|(v, c)| (*v, *c))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn max_variable(&self) -> Option<Variable> {
        self.terms.keys().next_back().copied()
    }

    pub fn evaluate(&self, assignment: &[F]) -> F {
        let mut acc = F::zero();
        for (variable, coefficient) in &self.terms {
            acc += *coefficient * assignment[*variable];
        }
        acc
    }
}

impl<F: LigeroField> Default for LinearCombination<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct R1csConstraint<F: LigeroField> {
    pub a: LinearCombination<F>,
    pub b: LinearCombination<F>,
    pub c: LinearCombination<F>,
}

impl<F: LigeroField> R1csConstraint<F> {
    pub fn new(a: LinearCombination<F>, b: LinearCombination<F>, c: LinearCombination<F>) -> Self {
        Self { a, b, c }
    }

    /// `(A(z), B(z), C(z))`.
    pub fn evaluate(&self, assignment: &[F]) -> (F, F, F) {
        (
            self.a.evaluate(assignment),
            self.b.evaluate(assignment),
            self.c.evaluate(assignment),
        )
    }

    pub fn is_satisfied(&self, assignment: &[F]) -> bool {
        let (a, b, c) = self.evaluate(assignment);
        a * b == c
    }

    fn max_variable(&self) -> Option<Variable> {
        [&self.a, &self.b, &self.c]
            .iter()
            .filter_map(|lc| lc.max_variable())
            .max()
    }
}

/// Selects one of the three constraint matrices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintMatrix {
    A,
    B,
    C,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Satisfaction {
    Satisfied,
    Violated { index: usize },
}

/// An immutable rank-1 constraint system. `z = (1, public..., private...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct R1cs<F: LigeroField> {
    num_variables: usize,
    num_public_inputs: usize,
    constraints: Vec<R1csConstraint<F>>,
}

impl<F: LigeroField> R1cs<F> {
    pub fn new(
        num_variables: usize,
        num_public_inputs: usize,
        constraints: Vec<R1csConstraint<F>>,
    ) -> LigeroResult<Self> {
        if num_variables == 0 {
            return Err(LigeroError::invalid_parameters(
                "R1CS instances require at least one variable (the constant 1).",
            ));
        }
        if num_public_inputs + 1 > num_variables {
            return Err(LigeroError::invalid_parameters(&format!(
                "{} public inputs do not fit in {} variables",
                num_public_inputs, num_variables
            )));
        }
        for (idx, constraint) in constraints.iter().enumerate() {
            if let Some(max) = constraint.max_variable() {
                if max >= num_variables {
                    return Err(LigeroError::invalid_parameters(&format!(
                        "constraint {} references variable {} but only {} exist",
                        idx, max, num_variables
                    )));
                }
            }
        }
        Ok(Self {
            num_variables,
            num_public_inputs,
            constraints,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_public_inputs(&self) -> usize {
        self.num_public_inputs
    }

    pub fn num_private_inputs(&self) -> usize {
        self.num_variables - 1 - self.num_public_inputs
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[R1csConstraint<F>] {
        &self.constraints
    }

    /// Evaluates every constraint; the first failing index wins.
    pub fn check(&self, assignment: &[F]) -> Satisfaction {
        match self
            .constraints
            .par_iter()
            .position_first(|constraint| !constraint.is_satisfied(assignment))
        {
            Some(index) => Satisfaction::Violated { index },
            None => Satisfaction::Satisfied,
        }
    }

    pub fn is_satisfied(&self, assignment: &[F]) -> bool {
        self.check(assignment) == Satisfaction::Satisfied
    }

    pub fn enforce_satisfied(&self, assignment: &[F]) -> LigeroResult<()> {
        if assignment.len() != self.num_variables {
            return Err(LigeroError::invalid_parameters(&format!(
                "assignment has {} entries, expected {}",
                assignment.len(),
                self.num_variables
            )));
        }
        match self.check(assignment) {
            Satisfaction::Satisfied => Ok(()),
            Satisfaction::Violated { index } => Err(LigeroError::unsatisfied(index)),
        }
    }

    /// `(Az, Bz, Cz)`.
    pub fn products(&self, assignment: &[F]) -> (Vec<F>, Vec<F>, Vec<F>) {
        let evaluations: Vec<(F, F, F)> = self
            .constraints
            .par_iter()
            .map(|constraint| constraint.evaluate(assignment))
            .collect();
        let mut az = Vec::with_capacity(evaluations.len());
        let mut bz = Vec::with_capacity(evaluations.len());
        let mut cz = Vec::with_capacity(evaluations.len());
        for (a, b, c) in evaluations {
            az.push(a);
            bz.push(b);
            cz.push(c);
        }
        (az, bz, cz)
    }

    /// `weightsᵀ · M` for one of the matrices, a vector over the variables.
    pub fn combine_rows(&self, matrix: ConstraintMatrix, weights: &[F]) -> Vec<F> {
        let mut out = vec![F::zero(); self.num_variables];
        for (constraint, weight) in self.constraints.iter().zip(weights.iter()) {
            if weight.is_zero() {
                continue;
            }
            let lc = match matrix {
                ConstraintMatrix::A => &constraint.a,
                ConstraintMatrix::B => &constraint.b,
                ConstraintMatrix::C => &constraint.c,
            };
            for (variable, coefficient) in lc.terms() {
                out[variable] += *weight * coefficient;
            }
        }
        out
    }

    /// Binds Fiat–Shamir challenges to the statement.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(F::NAME.as_bytes());
        hasher.update((self.num_variables as u64).to_le_bytes());
        hasher.update((self.num_public_inputs as u64).to_le_bytes());
        hasher.update((self.constraints.len() as u64).to_le_bytes());
        for constraint in &self.constraints {
            absorb_combination(&mut hasher, &constraint.a);
            absorb_combination(&mut hasher, &constraint.b);
            absorb_combination(&mut hasher, &constraint.c);
        }
        hasher.finalize().into()
    }
}

fn absorb_combination<F: LigeroField>(hasher: &mut Sha256, lc: &LinearCombination<F>) {
    hasher.update((lc.len() as u64).to_le_bytes());
    for (variable, coefficient) in lc.terms() {
        hasher.update((variable as u64).to_le_bytes());
        hasher.update(coefficient.to_bytes());
    }
}

/// Public and private parts of an assignment, without the constant slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness<F: LigeroField> {
    pub public: Vec<F>,
    pub private: Vec<F>,
}

impl<F: LigeroField> Witness<F> {
    pub fn new(public: Vec<F>, private: Vec<F>) -> Self {
        Self { public, private }
    }

    pub fn validate(&self, r1cs: &R1cs<F>) -> LigeroResult<()> {
        if self.public.len() != r1cs.num_public_inputs() {
            return Err(LigeroError::invalid_parameters(&format!(
                "expected {} public inputs, got {}",
                r1cs.num_public_inputs(),
                self.public.len()
            )));
        }
        if 1 + self.public.len() + self.private.len() != r1cs.num_variables() {
            return Err(LigeroError::invalid_parameters(
                "witness length does not match instance",
            ));
        }
        Ok(())
    }

    /// `z = (1, public..., private...)`.
    pub fn assignment(&self) -> Vec<F> {
        let mut assignment = Vec::with_capacity(1 + self.public.len() + self.private.len());
        assignment.push(F::one());
        assignment.extend_from_slice(&self.public);
        assignment.extend_from_slice(&self.private);
        assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligero::field_goldilocks::Goldilocks;

    type F = Goldilocks;

    fn g(v: u64) -> F {
        F::from_u64(v)
    }

    /// `x * y = z` with public `z`.
    fn multiplication_instance() -> R1cs<F> {
        let constraint = R1csConstraint::new(
            LinearCombination::from_terms([(2, g(1))]),
            LinearCombination::from_terms([(3, g(1))]),
            LinearCombination::from_terms([(1, g(1))]),
        );
        R1cs::new(4, 1, vec![constraint]).unwrap()
    }

    #[test]
    fn linear_combination_merges_and_drops_zeros() {
        let lc = LinearCombination::from_terms([(1, g(2)), (1, g(3)), (2, g(1)), (2, -g(1))]);
        assert_eq!(lc.len(), 1);
        assert_eq!(lc.terms().collect::<Vec<_>>(), vec![(1, g(5))]);
        assert_eq!(lc.evaluate(&[g(1), g(4)]), g(20));
    }

    #[test]
    fn satisfiability_reports_first_violation() {
        let r1cs = multiplication_instance();
        let good = Witness::new(vec![g(15)], vec![g(3), g(5)]);
        good.validate(&r1cs).unwrap();
        assert_eq!(r1cs.check(&good.assignment()), Satisfaction::Satisfied);

        let bad = Witness::new(vec![g(16)], vec![g(3), g(5)]);
        assert_eq!(
            r1cs.check(&bad.assignment()),
            Satisfaction::Violated { index: 0 }
        );
        let err = r1cs.enforce_satisfied(&bad.assignment()).unwrap_err();
        assert!(matches!(err, LigeroError::UnsatisfiedConstraint { index: 0 }));
    }

    #[test]
    fn first_failing_index_wins() {
        let eq = |v: Variable| {
            R1csConstraint::new(
                LinearCombination::from_terms([(v, g(1))]),
                LinearCombination::from_terms([(0, g(1))]),
                LinearCombination::from_terms([(0, g(1))]),
            )
        };
        let constraints = (1..40).map(eq).collect();
        let r1cs = R1cs::new(40, 0, constraints).unwrap();
        let mut z = vec![g(1); 40];
        z[7] = g(2);
        z[30] = g(2);
        assert_eq!(r1cs.check(&z), Satisfaction::Violated { index: 6 });
    }

    #[test]
    fn shape_validation() {
        let out_of_range = R1csConstraint::new(
            LinearCombination::from_terms([(4, g(1))]),
            LinearCombination::new(),
            LinearCombination::new(),
        );
        assert!(R1cs::new(4, 1, vec![out_of_range]).is_err());
        assert!(R1cs::<F>::new(2, 2, vec![]).is_err());
        assert!(R1cs::<F>::new(0, 0, vec![]).is_err());

        let r1cs = multiplication_instance();
        assert!(Witness::new(vec![], vec![g(3), g(5), g(1)]).validate(&r1cs).is_err());
        assert!(Witness::new(vec![g(15)], vec![g(3)]).validate(&r1cs).is_err());
    }

    #[test]
    fn products_and_row_combinations() {
        let r1cs = multiplication_instance();
        let z = Witness::new(vec![g(15)], vec![g(3), g(5)]).assignment();
        let (az, bz, cz) = r1cs.products(&z);
        assert_eq!((az[0], bz[0], cz[0]), (g(3), g(5), g(15)));

        let combined = r1cs.combine_rows(ConstraintMatrix::B, &[g(7)]);
        assert_eq!(combined, vec![g(0), g(0), g(0), g(7)]);
    }

    #[test]
    fn digest_depends_on_coefficients() {
        let a = multiplication_instance();
        let mut constraints = a.constraints().to_vec();
        constraints[0].c = LinearCombination::from_terms([(1, g(2))]);
        let b = R1cs::new(4, 1, constraints).unwrap();
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest(), multiplication_instance().digest());
    }
}
