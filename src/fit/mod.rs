//! Distribution fitting orchestration.
//!
//! Responsibilities:
//!
//! - run the optimizer for one model against `(x, y)` arrays (`fitter`)
//! - the persisted result of a fit (`record`)
//! - sessions: PDF resolution, domain restriction, history (`session`)

pub mod fitter;
pub mod record;
pub mod session;

pub use fitter::*;
pub use record::*;
pub use session::*;
