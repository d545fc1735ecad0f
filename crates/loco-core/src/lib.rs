//! loco-core: shared foundation for the locomotive simulation crates.
//!
//! Contains:
//! - units (uom SI types + constructors in locomotive-friendly units)
//! - numeric (Real, tolerances, interpolation helpers)
//! - smoothing (critically damped and exponential display filters)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod smoothing;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use smoothing::{CriticallyDamped, Exponential};
