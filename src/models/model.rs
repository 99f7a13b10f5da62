//! Density functions for each catalog model.
//!
//! The fitter relies on one primitive: evaluate `f(x; θ)` for a model kind.
//! Dispatch goes through `density_fn`, an explicit table from `ModelKind` to a
//! plain function pointer.
//!
//! No domain checks are done here. Out-of-domain inputs (e.g. `x <= 0` for the
//! lognormal) produce NaN/inf, which the solver reports as a numerical failure.

use std::f64::consts::PI;

use statrs::function::gamma::gamma;

use crate::domain::ModelKind;

/// `f(x; θ)`; `θ` must have `kind.param_len()` entries.
pub type DensityFn = fn(f64, &[f64]) -> f64;

/// `a · x^(−β)`
pub fn powerlaw(x: f64, p: &[f64]) -> f64 {
    let (a, beta) = (p[0], p[1]);
    a * x.powf(-beta)
}

/// `exp(−λx)`
pub fn exponential(x: f64, p: &[f64]) -> f64 {
    (-p[0] * x).exp()
}

/// `β^α / Γ(α) · x^(α−1) · exp(−βx)`
pub fn gamma_density(x: f64, p: &[f64]) -> f64 {
    let (alpha, beta) = (p[0], p[1]);
    beta.powf(alpha) / gamma(alpha) * x.powf(alpha - 1.0) * (-beta * x).exp()
}

/// `1 / (xσ√(2π)) · exp(−(ln x − μ)² / (2σ²))`
pub fn lognormal(x: f64, p: &[f64]) -> f64 {
    let (mu, sigma) = (p[0], p[1]);
    let z = x.ln() - mu;
    1.0 / (x * sigma * (2.0 * PI).sqrt()) * (z * z / (-2.0 * sigma * sigma)).exp()
}

/// Two-parameter Weibull, `α` shape and `β` scale.
pub fn weibull(x: f64, p: &[f64]) -> f64 {
    let (alpha, beta) = (p[0], p[1]);
    let u = x / beta;
    (alpha / beta) * u.powf(alpha - 1.0) * (-u.powf(alpha)).exp()
}

/// `(x + x₀)^(−β) · exp(−αx)`
pub fn exponential_powerlaw(x: f64, p: &[f64]) -> f64 {
    let (x0, beta, alpha) = (p[0], p[1], p[2]);
    (x + x0).powf(-beta) * (-alpha * x).exp()
}

/// Dispatch table.
pub fn density_fn(kind: ModelKind) -> DensityFn {
    match kind {
        ModelKind::PowerLaw => powerlaw,
        ModelKind::Exponential => exponential,
        ModelKind::Gamma => gamma_density,
        ModelKind::Lognormal => lognormal,
        ModelKind::Weibull => weibull,
        ModelKind::ExponentialPowerLaw => exponential_powerlaw,
    }
}

/// Evaluate the density of `kind` at a single point.
pub fn predict(kind: ModelKind, x: f64, params: &[f64]) -> f64 {
    density_fn(kind)(x, params)
}

/// Evaluate the density of `kind` at every point of `xs`.
pub fn predict_all(kind: ModelKind, xs: &[f64], params: &[f64]) -> Vec<f64> {
    let f = density_fn(kind);
    xs.iter().map(|&x| f(x, params)).collect()
}
