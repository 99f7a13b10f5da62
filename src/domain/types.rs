//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Supported density models.
///
/// Each variant maps to one closed-form density in `models::model`; there is no
/// other way to name a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ModelKind {
    #[serde(rename = "powerlaw")]
    #[value(name = "powerlaw", alias = "power-law")]
    PowerLaw,
    #[serde(rename = "exponential")]
    #[value(name = "exponential")]
    Exponential,
    #[serde(rename = "gamma")]
    #[value(name = "gamma")]
    Gamma,
    #[serde(rename = "lognormal")]
    #[value(name = "lognormal")]
    Lognormal,
    #[serde(rename = "weibull")]
    #[value(name = "weibull")]
    Weibull,
    #[serde(rename = "exponential_powerlaw")]
    #[value(name = "exponential_powerlaw", alias = "exponential-powerlaw")]
    ExponentialPowerLaw,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::PowerLaw,
        ModelKind::Exponential,
        ModelKind::Gamma,
        ModelKind::Lognormal,
        ModelKind::Weibull,
        ModelKind::ExponentialPowerLaw,
    ];

    /// Canonical identifier (also the serialized form).
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::PowerLaw => "powerlaw",
            ModelKind::Exponential => "exponential",
            ModelKind::Gamma => "gamma",
            ModelKind::Lognormal => "lognormal",
            ModelKind::Weibull => "weibull",
            ModelKind::ExponentialPowerLaw => "exponential_powerlaw",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::PowerLaw => "Power law",
            ModelKind::Exponential => "Exponential",
            ModelKind::Gamma => "Gamma",
            ModelKind::Lognormal => "Lognormal",
            ModelKind::Weibull => "Weibull",
            ModelKind::ExponentialPowerLaw => "Power law w/ exp. cutoff",
        }
    }

    /// Parameter names in the order the density takes them.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::PowerLaw => &["a", "beta"],
            ModelKind::Exponential => &["lambda"],
            ModelKind::Gamma => &["alpha", "beta"],
            ModelKind::Lognormal => &["mu", "sigma"],
            ModelKind::Weibull => &["alpha", "beta"],
            ModelKind::ExponentialPowerLaw => &["x0", "beta", "alpha"],
        }
    }

    pub fn param_len(self) -> usize {
        self.param_names().len()
    }

    /// Starting point used when the caller supplies no initial parameters.
    pub fn default_params(self) -> &'static [f64] {
        match self {
            ModelKind::PowerLaw => &[1.0, 1.5],
            ModelKind::Exponential => &[2.0],
            ModelKind::Gamma => &[1.0, 2.0],
            ModelKind::Lognormal => &[3.0, 2.0],
            ModelKind::Weibull => &[1.0, 2.0],
            ModelKind::ExponentialPowerLaw => &[5.3, 1.5, 0.9],
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = FitError;

    /// Case-insensitive; `-` and `_` are interchangeable and `power-law` is
    /// accepted for `powerlaw`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        let kind = match key.as_str() {
            "powerlaw" | "power_law" => ModelKind::PowerLaw,
            "exponential" => ModelKind::Exponential,
            "gamma" => ModelKind::Gamma,
            "lognormal" => ModelKind::Lognormal,
            "weibull" => ModelKind::Weibull,
            "exponential_powerlaw" | "exponential_power_law" => ModelKind::ExponentialPowerLaw,
            _ => return Err(FitError::UnknownModel(s.to_string())),
        };
        Ok(kind)
    }
}

/// Optimizer settings passed through to the least-squares solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Upper bound on Levenberg–Marquardt iterations.
    pub max_iterations: usize,
    /// Relative tolerance on both the cost reduction and the step size.
    pub tolerance: f64,
}

impl FitOptions {
    /// `sqrt(f64::EPSILON)`, the customary least-squares tolerance.
    pub const DEFAULT_TOLERANCE: f64 = 1.49012e-8;
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

    pub fn validate(&self) -> Result<(), FitError> {
        if self.max_iterations == 0 {
            return Err(FitError::InvalidOptions(
                "max_iterations must be >= 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(FitError::InvalidOptions(format!(
                "tolerance must be finite and > 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }
}

/// Exclusive bounds on the support used for a fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
}

impl Bounds {
    pub fn is_unbounded(&self) -> bool {
        self.x_min.is_none() && self.x_max.is_none()
    }

    /// Strict containment on both sides.
    pub fn contains(&self, x: f64) -> bool {
        self.x_min.is_none_or(|lo| x > lo) && self.x_max.is_none_or(|hi| x < hi)
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session-level PDF; each fit must bring its own data.
    NoData,
    Ready,
}

/// How comparison curves are laid out for a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotStyle {
    /// Every fitted curve on one set of axes.
    Overlay,
    /// One panel per fit.
    Panels,
}

/// Point spacing for evaluation grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Linear,
    Log,
}

/// A labelled (x, y) series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    /// Points that can be drawn on log-log axes (both coordinates > 0 and finite).
    pub fn positive_only(&self) -> Series {
        let (x, y) = self
            .x
            .iter()
            .zip(self.y.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite() && **x > 0.0 && **y > 0.0)
            .map(|(x, y)| (*x, *y))
            .unzip();
        Series {
            label: self.label.clone(),
            x,
            y,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
