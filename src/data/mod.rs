//! Sample data: empirical PDFs and synthetic sample generation.

pub mod empirical;
pub mod sample;

pub use empirical::*;
pub use sample::*;
