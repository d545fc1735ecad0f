//! loco-steam: water and steam properties for the boiler model.
//!
//! Provides:
//! - Saturation table: boiling point, densities, latent heat and specific
//!   heats as linear functions of gauge pressure
//! - Ideal-gas relations for the steam space above the water
//!
//! # Example
//!
//! ```
//! use loco_steam::{SaturationPoint, saturation};
//!
//! let sat = SaturationPoint::at(10.0);
//! assert!(sat.boiling_point_c > 150.0);
//! assert!(saturation::steam_density(10.0) > saturation::steam_density(5.0));
//! ```

pub mod ideal_gas;
pub mod saturation;

pub use ideal_gas::{STEAM_GAS_CONSTANT, pressure_bar, steam_mass_kg};
pub use saturation::SaturationPoint;
