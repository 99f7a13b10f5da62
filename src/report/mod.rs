//! Reporting utilities: terminal summaries and comparison data.

pub mod compare;
pub mod format;

pub use compare::*;
pub use format::*;
