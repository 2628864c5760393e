//! tl-core: shared foundation for the total-Lagrangian u/p solver.
//!
//! Contains:
//! - units (uom SI types + constructors used at API boundaries)
//! - numeric (relative error + finiteness checks)
//! - error (shared error type)
//! - timing (accumulating counters for assembly and linear solves)

pub mod error;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{TlError, TlResult};
pub use numeric::*;
pub use units::*;
