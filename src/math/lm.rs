//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ (f(x_i; θ) − y_i)²` over `θ`, for a scalar model function `f`.
//!
//! Steps are solved on the column-scaled Jacobian `J S⁻¹`, `S = diag(‖J_j‖)`,
//! so the damping `λ` is unitless and the SVD cut-off does not depend on how
//! the parameters are scaled. Each iteration:
//! - tests convergence at the current `θ` (see below)
//! - solves `[J S⁻¹; √λ I] u = [−r; 0]`, `δ = S⁻¹ u` (Marquardt scaling)
//! - accepts the step if the cost does not increase (λ ÷ 10, new Jacobian),
//!   otherwise retries with λ × 10
//!
//! Convergence is judged on the undamped Gauss–Newton step from the current
//! point: its size relative to `θ` is `≤ tol`, or the cost reduction it
//! predicts is `≤ tol · cost`. A vanishing gradient `Jᵀr` or a cost at the
//! round-off floor of `‖y‖²` also counts. A heavily damped step that merely
//! fails to move is never taken as convergence.

use nalgebra::{DMatrix, DVector};

use crate::error::ConvergenceReason;
use crate::math::ols::{gram_pseudo_inverse, solve_least_squares};

/// `sqrt(f64::EPSILON)`: relative step for finite differences.
const FD_STEP: f64 = 1.490_116_119_384_765_6e-8;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

/// Floor for Jacobian column norms so a flat direction still gets a scale.
const MIN_COLUMN_NORM: f64 = 1e-150;

/// Optimizer output.
#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: Vec<f64>,
    /// `pinv(JᵀJ) · SSE / (n − p)`; all `+∞` when `n <= p`.
    pub covariance: DMatrix<f64>,
    pub iterations: usize,
    pub sse: f64,
    /// The Jacobian at the solution dropped singular directions.
    pub rank_deficient: bool,
}

/// Why and where the optimizer stopped without converging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmFailure {
    pub reason: ConvergenceReason,
    pub iterations: usize,
    /// Last finite sum of squared residuals (NaN if none was ever finite).
    pub sse: f64,
}

/// Run Levenberg–Marquardt from `p0`.
///
/// `x` and `y` must have the same length; callers check that there are at
/// least as many points as parameters.
pub fn levenberg_marquardt<F>(
    f: F,
    x: &[f64],
    y: &[f64],
    p0: &[f64],
    max_iterations: usize,
    tolerance: f64,
) -> Result<LmSolution, LmFailure>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let mut p = DVector::from_column_slice(p0);
    let mut r = residuals(&f, x, y, p.as_slice());
    let Some(mut cost) = finite_cost(&r) else {
        return Err(LmFailure {
            reason: ConvergenceReason::NonFiniteResidual,
            iterations: 0,
            sse: f64::NAN,
        });
    };

    let fail = |reason, iterations, sse| LmFailure {
        reason,
        iterations,
        sse,
    };

    // Exact data can only be matched to round-off of the observations.
    let cost_floor = 100.0 * f64::EPSILON * f64::EPSILON * y.iter().map(|v| v * v).sum::<f64>();

    let mut jac = jacobian(&f, x, p.as_slice())
        .ok_or_else(|| fail(ConvergenceReason::NonFiniteResidual, 0, cost))?;
    let mut lambda = LAMBDA_INIT;
    let mut iterations = 0;

    loop {
        let scale = column_scale(&jac);
        if converged(&jac, &scale, &r, &p, cost, cost_floor, tolerance) {
            return Ok(finish(&f, x, p, cost, iterations));
        }
        if iterations == max_iterations {
            return Err(fail(ConvergenceReason::MaxIterations, iterations, cost));
        }
        iterations += 1;

        let mut saw_finite_trial = false;
        loop {
            let trial = scaled_step(&jac, &scale, &r, lambda)
                .map(|delta| &p + delta)
                .map(|p_new| {
                    let r_new = residuals(&f, x, y, p_new.as_slice());
                    (p_new, r_new)
                });

            if let Some((p_new, r_new)) = trial {
                match finite_cost(&r_new) {
                    Some(cost_new) if cost_new <= cost => {
                        p = p_new;
                        r = r_new;
                        cost = cost_new;
                        lambda = (lambda / 10.0).max(LAMBDA_MIN);
                        jac = jacobian(&f, x, p.as_slice()).ok_or_else(|| {
                            fail(ConvergenceReason::NonFiniteResidual, iterations, cost)
                        })?;
                        break;
                    }
                    other => saw_finite_trial |= other.is_some(),
                }
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                let reason = if saw_finite_trial {
                    ConvergenceReason::Stalled
                } else {
                    ConvergenceReason::NonFiniteResidual
                };
                return Err(fail(reason, iterations, cost));
            }
        }
    }
}

/// Gauss–Newton stationarity at `p`.
fn converged(
    jac: &DMatrix<f64>,
    scale: &[f64],
    r: &DVector<f64>,
    p: &DVector<f64>,
    cost: f64,
    cost_floor: f64,
    tolerance: f64,
) -> bool {
    if cost <= cost_floor {
        return true;
    }
    let grad = jac.transpose() * r;
    if grad.amax() <= f64::MIN_POSITIVE {
        return true;
    }
    let Some(step) = scaled_step(jac, scale, r, 0.0) else {
        return false;
    };
    if step.norm() <= tolerance * (p.norm() + tolerance) {
        return true;
    }
    let predicted = cost - (r + jac * &step).norm_squared();
    predicted <= tolerance * cost
}

fn column_scale(jac: &DMatrix<f64>) -> Vec<f64> {
    jac.column_iter()
        .map(|c| c.norm().max(MIN_COLUMN_NORM))
        .collect()
}

/// Minimizes `‖J δ + r‖² + λ ‖S δ‖²`; `λ = 0` gives the Gauss–Newton step.
fn scaled_step(
    jac: &DMatrix<f64>,
    scale: &[f64],
    r: &DVector<f64>,
    lambda: f64,
) -> Option<DVector<f64>> {
    let (n, m) = jac.shape();
    let rows = if lambda > 0.0 { n + m } else { n };

    let mut a = DMatrix::<f64>::zeros(rows, m);
    for (j, s) in scale.iter().enumerate() {
        for i in 0..n {
            a[(i, j)] = jac[(i, j)] / s;
        }
        if lambda > 0.0 {
            a[(n + j, j)] = lambda.sqrt();
        }
    }
    let mut b = DVector::<f64>::zeros(rows);
    b.rows_mut(0, n).copy_from(&(-r));

    let u = solve_least_squares(&a, &b)?;
    let delta = DVector::from_iterator(m, u.iter().zip(scale).map(|(u, s)| u / s));
    delta.iter().all(|v| v.is_finite()).then_some(delta)
}

fn residuals<F: Fn(f64, &[f64]) -> f64>(f: &F, x: &[f64], y: &[f64], p: &[f64]) -> DVector<f64> {
    DVector::from_iterator(x.len(), x.iter().zip(y.iter()).map(|(&xi, &yi)| f(xi, p) - yi))
}

fn finite_cost(r: &DVector<f64>) -> Option<f64> {
    let c = r.norm_squared();
    c.is_finite().then_some(c)
}

/// Forward differences; `None` if any entry is non-finite.
fn jacobian<F: Fn(f64, &[f64]) -> f64>(f: &F, x: &[f64], p: &[f64]) -> Option<DMatrix<f64>> {
    let n = x.len();
    let m = p.len();
    let base: Vec<f64> = x.iter().map(|&xi| f(xi, p)).collect();
    let mut jac = DMatrix::<f64>::zeros(n, m);
    let mut shifted = p.to_vec();

    for j in 0..m {
        let mut h = FD_STEP * p[j].abs();
        if h == 0.0 {
            h = FD_STEP;
        }
        shifted[j] = p[j] + h;
        // Use the actually representable step.
        let h_eff = shifted[j] - p[j];
        for i in 0..n {
            jac[(i, j)] = (f(x[i], &shifted) - base[i]) / h_eff;
        }
        shifted[j] = p[j];
    }

    jac.iter().all(|v| v.is_finite()).then_some(jac)
}

fn finish<F: Fn(f64, &[f64]) -> f64>(
    f: &F,
    x: &[f64],
    p: DVector<f64>,
    sse: f64,
    iterations: usize,
) -> LmSolution {
    let n = x.len();
    let m = p.len();

    let (covariance, rank_deficient) = match jacobian(f, x, p.as_slice())
        .and_then(|j| gram_pseudo_inverse(&j))
    {
        Some((inv, dropped)) if n > m => (inv * (sse / (n - m) as f64), dropped),
        Some((_, dropped)) => (DMatrix::from_element(m, m, f64::INFINITY), dropped),
        None => (DMatrix::from_element(m, m, f64::INFINITY), true),
    };

    tracing::debug!(iterations, sse, rank_deficient, "levenberg-marquardt converged");

    LmSolution {
        params: p.iter().copied().collect(),
        covariance,
        iterations,
        sse,
        rank_deficient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x: f64, p: &[f64]) -> f64 {
        p[0] * x + p[1]
    }

    #[test]
    fn recovers_exact_line() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let sol = levenberg_marquardt(line, &xs, &ys, &[0.0, 0.0], 100, 1.49012e-8).unwrap();
        assert!((sol.params[0] - 2.0).abs() < 1e-6, "{:?}", sol.params);
        assert!((sol.params[1] - 1.0).abs() < 1e-6, "{:?}", sol.params);
        assert!(sol.sse < 1e-10);
        assert!(!sol.rank_deficient);
    }

    #[test]
    fn covariance_is_symmetric_and_scaled_by_noise() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| 0.5 * x - 3.0 + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        let sol = levenberg_marquardt(line, &xs, &ys, &[1.0, 1.0], 100, 1.49012e-8).unwrap();
        let c = &sol.covariance;
        assert!((c[(0, 1)] - c[(1, 0)]).abs() < 1e-12);
        assert!(c[(0, 0)] > 0.0 && c[(1, 1)] > 0.0);
    }

    #[test]
    fn square_problem_has_infinite_covariance() {
        let sol =
            levenberg_marquardt(line, &[0.0, 1.0], &[1.0, 3.0], &[0.0, 0.0], 100, 1e-10).unwrap();
        assert!(sol.covariance.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn reports_iteration_limit() {
        let xs: Vec<f64> = (0..=20).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| (-0.5 * x).exp()).collect();
        let err =
            levenberg_marquardt(|x, p| (-p[0] * x).exp(), &xs, &ys, &[2.0], 1, 1e-12).unwrap_err();
        assert_eq!(err.reason, ConvergenceReason::MaxIterations);
        assert_eq!(err.iterations, 1);
        assert!(err.sse.is_finite());
    }

    #[test]
    fn reports_non_finite_start() {
        let log_shift = |x: f64, p: &[f64]| (x - p[0]).ln();
        let err = levenberg_marquardt(log_shift, &[0.0, 1.0, 2.0], &[0.0; 3], &[5.0], 50, 1e-8)
            .unwrap_err();
        assert_eq!(err.reason, ConvergenceReason::NonFiniteResidual);
        assert_eq!(err.iterations, 0);
    }

    #[test]
    fn small_jacobian_does_not_stop_at_the_start() {
        // Power law on x in [1e-3, 1e-1]: ‖J‖ is tiny, so the start must not pass
        // for a converged point just because damped steps barely move.
        let xs: Vec<f64> = (0..100).map(|i| 10f64.powf(-3.0 + 2.0 * i as f64 / 99.0)).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x.powf(1.5)).collect();
        let power = |x: f64, p: &[f64]| p[0] * x.powf(p[1]);
        let sol = levenberg_marquardt(power, &xs, &ys, &[1.0, 1.5], 1000, 1.49012e-8).unwrap();
        assert!(sol.iterations > 0);
        assert!((sol.params[0] - 2.0).abs() < 1e-4, "{:?}", sol.params);
        assert!((sol.params[1] - 1.5).abs() < 1e-4, "{:?}", sol.params);
    }

    #[test]
    fn exact_data_at_the_start_converges_immediately() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let sol = levenberg_marquardt(line, &xs, &ys, &[2.0, 1.0], 100, 1.49012e-8).unwrap();
        assert_eq!(sol.iterations, 0);
        assert_eq!(sol.params, vec![2.0, 1.0]);
    }
}
