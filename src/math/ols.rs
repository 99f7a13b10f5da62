//! Linear least squares solver.
//!
//! Every Levenberg–Marquardt step solves a small, tall linear problem:
//!
//! ```text
//! minimize ‖A δ − b‖²
//! ```
//!
//! where `A` stacks the Jacobian on top of the diagonal damping rows.
//!
//! Implementation choices:
//! - We use SVD so tall (more rows than columns) and nearly rank-deficient
//!   systems are handled the same way.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Parameter dimension is tiny (1–3 columns), so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-14, 1e-10, 1e-8] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

/// Moore–Penrose inverse of `JᵀJ` computed from the SVD of `J`.
///
/// Singular values below `ε · max(n, m) · s_max` are dropped. The second value
/// reports whether any were dropped (the problem is rank deficient).
pub fn gram_pseudo_inverse(j: &DMatrix<f64>) -> Option<(DMatrix<f64>, bool)> {
    let (n, m) = j.shape();
    let svd = j.clone().svd(false, true);
    let v_t = svd.v_t.as_ref()?;
    let s = &svd.singular_values;

    let s_max = s.iter().copied().fold(0.0_f64, f64::max);
    let threshold = f64::EPSILON * n.max(m) as f64 * s_max;

    let mut out = DMatrix::<f64>::zeros(m, m);
    let mut dropped = false;
    for (k, &sk) in s.iter().enumerate() {
        if sk <= threshold {
            dropped = true;
            continue;
        }
        let v = v_t.row(k).transpose();
        out += (&v * v.transpose()) / (sk * sk);
    }
    // Rows of `v_t` beyond min(n, m) do not exist; those directions are unidentified.
    if s.len() < m {
        dropped = true;
    }
    Some((out, dropped))
}
