//! Low-level fitting routine for a single model kind.
//!
//! Given:
//! - support values `x_i`
//! - observed relative frequencies `y_i`
//! - a starting parameter vector `θ₀`
//!
//! we run Levenberg–Marquardt on the model's density and return the optimized
//! parameters with their covariance estimate.

use crate::domain::{FitOptions, ModelKind};
use crate::error::FitError;
use crate::math::levenberg_marquardt;
use crate::models::density_fn;

/// Optimizer result for one model.
#[derive(Debug, Clone)]
pub struct CurveFit {
    pub model: ModelKind,
    pub params: Vec<f64>,
    /// Row-major `p × p` covariance.
    pub covariance: Vec<Vec<f64>>,
    pub iterations: usize,
    pub sse: f64,
}

/// Fit `model` to `(x, y)` starting from `p0`.
pub fn curve_fit(
    model: ModelKind,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    opts: &FitOptions,
) -> Result<CurveFit, FitError> {
    opts.validate()?;
    if p0.len() != model.param_len() {
        return Err(FitError::ParameterCount {
            model,
            expected: model.param_len(),
            actual: p0.len(),
        });
    }
    if x.len() != y.len() {
        return Err(FitError::InvalidOptions(format!(
            "x and y lengths differ ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < p0.len() {
        return Err(FitError::InsufficientData {
            model,
            points: x.len(),
            params: p0.len(),
        });
    }

    let sol = levenberg_marquardt(
        density_fn(model),
        x,
        y,
        p0,
        opts.max_iterations,
        opts.tolerance,
    )
    .map_err(|failure| FitError::Convergence {
        model,
        reason: failure.reason,
        iterations: failure.iterations,
        sse: failure.sse,
    })?;

    if sol.rank_deficient {
        tracing::warn!(%model, "covariance of the parameters could not be fully estimated");
    }

    let p = sol.params.len();
    let covariance = (0..p)
        .map(|i| (0..p).map(|j| sol.covariance[(i, j)]).collect())
        .collect();

    Ok(CurveFit {
        model,
        params: sol.params,
        covariance,
        iterations: sol.iterations,
        sse: sol.sse,
    })
}
