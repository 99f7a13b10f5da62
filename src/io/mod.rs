//! Input/output helpers.
//!
//! - CSV sample ingest + validation (`ingest`)
//! - per-point CSV export (`export`)
//! - session summary JSON read/write (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
