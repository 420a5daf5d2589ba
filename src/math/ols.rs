//! Linear least squares solver.
//!
//! Each Levenberg–Marquardt iteration solves a small damped linear problem
//!
//! ```text
//! minimize ‖J δ + r‖² + λ ‖D δ‖²
//! ```
//!
//! which we write as an ordinary least squares problem on the stacked matrix
//! `[J; √λ D]` and right-hand side `[-r; 0]`.
//!
//! Implementation choices:
//! - SVD, because the stacked matrix is tall and can be close to rank deficient
//!   when a parameter barely moves the curve.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is 1–3 columns, so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Stack `a` on top of `b` (same column count).
pub fn stack_rows(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::<f64>::zeros(a.nrows() + b.nrows(), a.ncols());
    out.rows_mut(0, a.nrows()).copy_from(a);
    out.rows_mut(a.nrows(), b.nrows()).copy_from(b);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn damping_rows_shrink_the_step() {
        // One parameter, J = [1], r = [-4]: undamped step is 4, damped (λ = 1) is 2.
        let j = DMatrix::from_row_slice(1, 1, &[1.0]);
        let damping = DMatrix::from_row_slice(1, 1, &[1.0]);
        let a = stack_rows(&j, &damping);
        let b = DVector::from_row_slice(&[4.0, 0.0]);

        let step = solve_least_squares(&a, &b).unwrap();
        assert!((step[0] - 2.0).abs() < 1e-10);
    }
}
