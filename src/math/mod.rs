//! Shared linear-algebra primitives for the regression engine.
//!
//! The Newton/IRLS solver repeatedly solves small symmetric systems
//! `H δ = g`. We solve them through SVD rather than a plain inverse so that
//! a rank-deficient Hessian surfaces as an explicit `None` instead of a
//! panic or a silently garbage step.

use nalgebra::{DMatrix, DVector};

/// Solve `a x = b` via SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_linear(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails. One-hot
    // designs can produce nearly collinear columns on heavily filtered
    // subsets, so we balance numerical stability with solution acceptance.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

/// Numerical rank of a matrix with a relative singular-value tolerance.
pub fn rank(a: &DMatrix<f64>, rel_tol: f64) -> usize {
    let svd = a.clone().svd(false, false);
    let max_sv = svd.singular_values.iter().cloned().fold(0.0_f64, f64::max);
    if max_sv <= 0.0 {
        return 0;
    }
    svd.singular_values
        .iter()
        .filter(|&&sv| sv > max_sv * rel_tol)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_simple_system() {
        // x + y = 3, x - y = 1  =>  x = 2, y = 1
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, -1.0]);
        let b = DVector::from_row_slice(&[3.0, 1.0]);
        let x = solve_linear(&a, &b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-10);
        assert!((x[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn rank_detects_duplicate_columns() {
        let full = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        assert_eq!(rank(&full, 1e-9), 2);

        let deficient = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
        assert_eq!(rank(&deficient, 1e-9), 1);
    }

    #[test]
    fn rank_of_zero_matrix_is_zero() {
        let zero = DMatrix::zeros(3, 2);
        assert_eq!(rank(&zero, 1e-9), 0);
    }
}
