//! Error types.
//!
//! - `FitError`: recoverable, per-call failures of the fitting library. Every
//!   variant leaves a session usable for the next attempt.
//! - `AppError`: what the binary reports, carrying a process exit code.

use thiserror::Error;

use crate::domain::ModelKind;

/// Why the optimizer gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceReason {
    /// Iteration limit reached before the tolerance was met.
    MaxIterations,
    /// The model produced NaN/inf residuals (e.g. log of a non-positive value).
    NonFiniteResidual,
    /// Damping grew without any step reducing the cost.
    Stalled,
}

impl std::fmt::Display for ConvergenceReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConvergenceReason::MaxIterations => "iteration limit reached",
            ConvergenceReason::NonFiniteResidual => "non-finite residuals",
            ConvergenceReason::Stalled => "no step reduced the residual",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Neither the session nor the call supplied a sample.
    #[error("no data: the session has no sample and none was passed to the fit")]
    NoData,

    #[error("distribution '{0}' is not defined")]
    UnknownModel(String),

    #[error("{model} takes {expected} parameters, got {actual}")]
    ParameterCount {
        model: ModelKind,
        expected: usize,
        actual: usize,
    },

    #[error("{model} has {params} parameters but only {points} data points")]
    InsufficientData {
        model: ModelKind,
        points: usize,
        params: usize,
    },

    /// Domain restriction removed every support point.
    #[error(
        "no support points remain in ({}, {})",
        fmt_bound(.x_min, "-inf"),
        fmt_bound(.x_max, "inf")
    )]
    EmptyDomain { x_min: Option<f64>, x_max: Option<f64> },

    #[error("{model} fit did not converge after {iterations} iterations ({reason}, sse={sse:.6e})")]
    Convergence {
        model: ModelKind,
        reason: ConvergenceReason,
        iterations: usize,
        sse: f64,
    },

    #[error("no fit has been recorded yet")]
    EmptyHistory,

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

fn fmt_bound(v: &Option<f64>, open: &str) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| open.to_string())
}

impl FitError {
    /// True for failures raised by the optimizer rather than by bad input.
    pub fn is_numerical(&self) -> bool {
        matches!(self, FitError::Convergence { .. })
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match &err {
            FitError::NoData | FitError::EmptyHistory => 3,
            FitError::Convergence { .. } => 4,
            _ => 2,
        };
        AppError::new(code, err.to_string())
    }
}
