//! Quadratic (Hadamard) check `x ∘ y = w` on the systematic domain.

use super::errors::{LigeroError, LigeroResult};
use super::field_utils::LigeroField;
use super::polynomial::effective_len;
use super::setup::{ProtocolSetup, RowLayout};

/// `Σ_i ρ_i (x_i·y_i − w_i) (+ mask)` on one column.
pub fn quadratic_combination_at<F: LigeroField>(
    layout: &RowLayout,
    coefficients: &[F],
    column: &[F],
    mask: Option<usize>,
) -> F {
    let mut acc = F::zero();
    for (i, rho) in coefficients.iter().enumerate() {
        acc += *rho * (column[layout.x(i)] * column[layout.y(i)] - column[layout.w(i)]);
    }
    if let Some(mask_row) = mask {
        acc += column[mask_row];
    }
    acc
}

/// Quotient `h` of the combined Hadamard polynomial by `Z_S`.
pub fn prove_quadratic_check<F: LigeroField>(
    setup: &ProtocolSetup<F>,
    codewords: &[Vec<F>],
    coefficients: &[F],
    mask: Option<usize>,
) -> LigeroResult<Vec<F>> {
    let layout = setup.layout();
    let n = setup.config().codeword_size();
    let evaluations: Vec<F> = (0..n)
        .map(|p| {
            let mut acc = F::zero();
            for (i, rho) in coefficients.iter().enumerate() {
                acc += *rho
                    * (codewords[layout.x(i)][p] * codewords[layout.y(i)][p]
                        - codewords[layout.w(i)][p]);
            }
            if let Some(mask_row) = mask {
                acc += codewords[mask_row][p];
            }
            acc
        })
        .collect();

    let numerator = setup.code().interpolate_codeword(&evaluations)?;
    let (mut quotient, remainder) = setup
        .systematic_domain()
        .vanishing_polynomial()
        .divide(&numerator)?;
    if remainder.iter().any(|c| !c.is_zero()) {
        return Err(LigeroError::protocol_error(
            "quadratic check",
            "x ∘ y − w does not vanish on the systematic domain",
        ));
    }
    let bound = setup.config().quotient_len();
    if effective_len(&quotient) > bound {
        return Err(LigeroError::protocol_error(
            "quadratic check",
            "quotient exceeds degree bound",
        ));
    }
    quotient.resize(bound, F::zero());
    Ok(quotient)
}
