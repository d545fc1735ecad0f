//! Time stepping for a steam locomotive.
//!
//! Provides:
//! - Boiler water/steam equilibrium with a bisection phase-change solver
//! - The per-tick locomotive update wiring fire, boiler and cylinders
//! - Parallel stepping of independent locomotives
//! - Scripted scenario runs with decimated recording

pub mod boiler;
pub mod error;
pub mod fleet;
pub mod locomotive;
pub mod scenario;

// Internal modules
mod checks;

// Re-exports for public API
pub use boiler::{Boiler, BoilerState, EquilibriumSolver, PhaseChange, SolveBranch};
pub use error::{SimError, SimResult};
pub use fleet::tick_fleet;
pub use locomotive::{LocoState, Locomotive, TickInputs, TickOutputs};
pub use scenario::{
    ControlSchedule, ControlStep, Controls, RunningGear, SimOptions, SimRecord, Tender,
    run_scenario,
};
