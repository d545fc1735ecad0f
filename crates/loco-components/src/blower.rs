//! Smokebox blower.

use crate::common::check_non_negative;
use crate::error::ComponentResult;
use loco_core::clamp01;

/// Live steam jet that forces draft while the engine is not exhausting.
#[derive(Debug, Clone, PartialEq)]
pub struct Blower {
    /// Steam flow with the blower fully open (kg/s)
    pub max_rate_kg_s: f64,
}

impl Default for Blower {
    fn default() -> Self {
        Self { max_rate_kg_s: 1.0 }
    }
}

impl Blower {
    pub fn new(max_rate_kg_s: f64) -> ComponentResult<Self> {
        check_non_negative(max_rate_kg_s, "blower rate")?;
        Ok(Self { max_rate_kg_s })
    }

    /// Steam flow (kg/s); nothing flows without boiler pressure.
    pub fn steam_flow(&self, setting: f64, boiler_pressure_bar: f64) -> f64 {
        if boiler_pressure_bar <= 0.0 {
            return 0.0;
        }
        clamp01(setting) * self.max_rate_kg_s
    }
}
