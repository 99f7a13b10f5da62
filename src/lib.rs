//! `distfit` library crate.
//!
//! Fits closed-form densities to the empirical frequency distribution of a
//! sample. Start with [`fit::FitSession`]; the `distfit` binary is a thin
//! wrapper over [`app::run`].

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
