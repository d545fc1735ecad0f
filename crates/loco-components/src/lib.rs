//! loco-components: the parts of a steam locomotive around the boiler.
//!
//! Provides models for:
//! - The firebox (coal bed, draft and oxygen supply, heat yield)
//! - Double-acting cylinders with cutoff, expansion and admission hysteresis
//! - Injector, safety valve, stoker and blower
//!
//! Each component is a parameter struct plus, where it remembers anything
//! between ticks, a separate state struct owned by the caller.
//!
//! # Example
//!
//! ```
//! use loco_components::{Firebox, FireState};
//!
//! let firebox = Firebox::default();
//! let mut fire = FireState::new(200.0, true);
//!
//! // 3 kg/s of exhaust steam, damper fully open
//! firebox.set_oxygen_supply(&mut fire, 3.0, 1.0, 0.1);
//! let heat_kw = firebox.smoothed_heat_yield_rate(&mut fire, 0.1);
//! let burned = firebox.burn(&mut fire, 0.1);
//! assert!(heat_kw > 0.0 && burned > 0.0);
//! ```

pub mod blower;
pub mod common;
pub mod cylinder;
pub mod error;
pub mod fire;
pub mod injector;
pub mod safety_valve;
pub mod stoker;

// Re-exports
pub use blower::Blower;
pub use cylinder::{CylinderState, Cylinders, PistonPhase};
pub use error::{ComponentError, ComponentResult};
pub use fire::{FireState, Firebox, FuelTransfer, combustion_efficiency, firebox_temperature};
pub use injector::{Injector, WaterTransfer};
pub use safety_valve::{SafetyValve, SafetyValveState};
pub use stoker::Stoker;
