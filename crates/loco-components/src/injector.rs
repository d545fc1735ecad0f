//! Feedwater injector.

use crate::common::{check_non_negative, check_positive};
use crate::error::ComponentResult;
use loco_core::clamp01;

/// Injector delivering tender water into the boiler.
#[derive(Debug, Clone, PartialEq)]
pub struct Injector {
    /// Delivery at full setting (kg/s)
    pub max_rate_kg_s: f64,
    /// Exponent applied to the setting
    pub gamma: f64,
    /// Temperature of the water delivered (°C)
    pub feedwater_temp_c: f64,
    pub feedwater_density_kg_m3: f64,
    /// Tender water used per kg delivered
    pub consumption_multiplier: f64,
}

impl Default for Injector {
    fn default() -> Self {
        Self {
            max_rate_kg_s: 10.0,
            gamma: 4.0,
            feedwater_temp_c: 15.0,
            feedwater_density_kg_m3: 999.1,
            consumption_multiplier: 1.0,
        }
    }
}

/// Water moved by one injector step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WaterTransfer {
    /// Mass entering the boiler (kg)
    pub into_boiler_kg: f64,
    /// Mass leaving the tender (kg)
    pub from_tender_kg: f64,
    /// Temperature of the delivered water (°C)
    pub feedwater_temp_c: f64,
}

impl Injector {
    pub fn new(max_rate_kg_s: f64) -> ComponentResult<Self> {
        let injector = Self {
            max_rate_kg_s,
            ..Self::default()
        };
        injector.validate()?;
        Ok(injector)
    }

    pub fn with_consumption_multiplier(mut self, multiplier: f64) -> Self {
        self.consumption_multiplier = multiplier;
        self
    }

    pub fn validate(&self) -> ComponentResult<()> {
        check_non_negative(self.max_rate_kg_s, "injector rate")?;
        check_positive(self.gamma, "injector gamma")?;
        check_non_negative(self.feedwater_temp_c, "feedwater temperature")?;
        check_positive(self.feedwater_density_kg_m3, "feedwater density")?;
        check_positive(self.consumption_multiplier, "water consumption multiplier")?;
        Ok(())
    }

    /// Delivery rate (kg/s) at an injector setting.
    pub fn rate(&self, setting: f64) -> f64 {
        clamp01(setting).powf(self.gamma) * self.max_rate_kg_s
    }

    /// Room left in the boiler (kg of feedwater) given its capacity and
    /// current water volume, both in litres.
    pub fn headroom_kg(&self, capacity_l: f64, water_volume_l: f64) -> f64 {
        (capacity_l - water_volume_l).max(0.0) * self.feedwater_density_kg_m3 / 1000.0
    }

    /// Water moved over `dt`, limited by tender supply and boiler room.
    pub fn transfer(
        &self,
        setting: f64,
        dt: f64,
        tender_water_kg: f64,
        headroom_kg: f64,
    ) -> WaterTransfer {
        if dt <= 0.0 {
            return WaterTransfer::default();
        }
        let requested = self.rate(setting) * dt;
        let taken = (requested * self.consumption_multiplier).min(tender_water_kg.max(0.0));
        let delivered = (taken / self.consumption_multiplier).min(headroom_kg.max(0.0));
        WaterTransfer {
            into_boiler_kg: delivered,
            from_tender_kg: delivered * self.consumption_multiplier,
            feedwater_temp_c: self.feedwater_temp_c,
        }
    }
}
