//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the closed model catalog identifiers (`ModelKind`)
//! - optimizer configuration (`FitOptions`) and fit bounds (`Bounds`)
//! - presentation-neutral series and layout enums (`Series`, `PlotStyle`)

pub mod types;

pub use types::*;
