//! Low-degree test by random linear combination.
//!
//! Every base row is tested against the bound `deg < s`: the prover sends
//! `u = Σ γ_i Û_i (+ γ_mask·mask)` in coefficient form and the verifier
//! compares `u` with the same combination of opened columns.

use super::errors::{LigeroError, LigeroResult};
use super::field_utils::LigeroField;
use super::polynomial::{add_scaled, effective_len, evaluate};
use super::setup::RowLayout;

pub fn prove_ldt_combination<F: LigeroField>(
    layout: &RowLayout,
    row_coefficients: &[Vec<F>],
    gamma: &[F],
    mask: Option<usize>,
    degree_bound: usize,
) -> LigeroResult<Vec<F>> {
    if gamma.len() != layout.ldt_combination_len() {
        return Err(LigeroError::protocol_error(
            "ldt",
            "combination challenge does not match the row layout",
        ));
    }
    let mut combined = vec![F::zero(); degree_bound];
    for (row, coefficient) in gamma.iter().take(layout.base_rows()).enumerate() {
        add_scaled(&mut combined, *coefficient, &row_coefficients[row]);
    }
    if let Some(mask_row) = mask {
        add_scaled(&mut combined, gamma[layout.base_rows()], &row_coefficients[mask_row]);
    }
    if effective_len(&combined) > degree_bound {
        return Err(LigeroError::protocol_error(
            "ldt",
            "combined codeword exceeds degree bound",
        ));
    }
    combined.resize(degree_bound, F::zero());
    Ok(combined)
}

/// `Σ γ_i U_i[j] (+ γ_mask·mask[j])` for an opened column.
pub fn combined_value_at<F: LigeroField>(
    layout: &RowLayout,
    gamma: &[F],
    column: &[F],
    mask: Option<usize>,
) -> F {
    let base = layout.base_rows();
    let mut acc = F::zero();
    for (coefficient, value) in gamma.iter().zip(column).take(base) {
        acc += *coefficient * *value;
    }
    if let Some(mask_row) = mask {
        acc += gamma[base] * column[mask_row];
    }
    acc
}

/// Whether `u(η)` agrees with the combined column value.
pub fn check_combination_at<F: LigeroField>(
    layout: &RowLayout,
    combination: &[F],
    gamma: &[F],
    point: F,
    column: &[F],
    mask: Option<usize>,
) -> bool {
    evaluate(combination, point) == combined_value_at(layout, gamma, column, mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ligero::domain::EvaluationDomain;
    use crate::ligero::field_goldilocks::Goldilocks;
    use crate::ligero::field_utils::random_vector;
    use rand::{rngs::StdRng, SeedableRng};

    type F = Goldilocks;

    fn layout(zk: bool) -> RowLayout {
        RowLayout {
            witness_rows: 2,
            constraint_rows: 1,
            repetitions: 1,
            zk,
        }
    }

    #[test]
    fn combination_agrees_with_columns() {
        let mut rng = StdRng::seed_from_u64(7);
        let layout = layout(true);
        let domain =
            EvaluationDomain::new_coset(4, F::multiplicative_generator().unwrap()).unwrap();
        let rows: Vec<Vec<F>> = (0..layout.total_rows())
            .map(|_| random_vector(&mut rng, 4))
            .collect();
        let codewords: Vec<Vec<F>> = rows.iter().map(|c| domain.fft(c).unwrap()).collect();
        let gamma: Vec<F> = random_vector(&mut rng, layout.ldt_combination_len());
        let mask = layout.blinding(0, crate::ligero::setup::BlindingSlot::Ldt);

        let u = prove_ldt_combination(&layout, &rows, &gamma, mask, 4).unwrap();
        for position in 0..domain.size() {
            let column: Vec<F> = codewords.iter().map(|row| row[position]).collect();
            assert!(check_combination_at(
                &layout,
                &u,
                &gamma,
                domain.element(position),
                &column,
                mask
            ));
        }

        let mut forged = codewords[1].clone();
        forged[3] += F::one();
        let column: Vec<F> = codewords
            .iter()
            .enumerate()
            .map(|(i, row)| if i == 1 { forged[3] } else { row[3] })
            .collect();
        assert!(!check_combination_at(&layout, &u, &gamma, domain.element(3), &column, mask));
    }

    #[test]
    fn high_degree_rows_are_refused() {
        let layout = layout(false);
        let rows = vec![vec![F::one(); 6]; layout.total_rows()];
        let gamma = vec![F::one(); layout.ldt_combination_len()];
        assert!(prove_ldt_combination(&layout, &rows, &gamma, None, 4).is_err());
    }
}
