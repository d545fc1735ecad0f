//! Mechanical stoker.

use crate::common::check_non_negative;
use crate::error::ComponentResult;
use loco_core::clamp01;

/// Steam-driven screw feeding coal from the tender to the grate.
#[derive(Debug, Clone, PartialEq)]
pub struct Stoker {
    /// Firing rate at rated pressure and full setting (kg/s)
    pub max_firing_rate_kg_s: f64,
}

impl Default for Stoker {
    fn default() -> Self {
        Self {
            max_firing_rate_kg_s: 2.0,
        }
    }
}

impl Stoker {
    pub fn new(max_firing_rate_kg_s: f64) -> ComponentResult<Self> {
        check_non_negative(max_firing_rate_kg_s, "stoker firing rate")?;
        Ok(Self {
            max_firing_rate_kg_s,
        })
    }

    /// Firing rate (kg/s). The stoker engine runs on boiler steam, so its
    /// speed follows pressure relative to the rated pressure.
    pub fn firing_rate(&self, pressure_bar: f64, rated_pressure_bar: f64, setting: f64) -> f64 {
        if rated_pressure_bar <= 0.0 {
            return 0.0;
        }
        let drive = clamp01(pressure_bar / rated_pressure_bar * clamp01(setting));
        self.max_firing_rate_kg_s * drive * drive
    }

    /// Coal delivered over `dt`, limited by what the tender holds.
    pub fn feed(
        &self,
        pressure_bar: f64,
        rated_pressure_bar: f64,
        setting: f64,
        dt: f64,
        tender_coal_kg: f64,
    ) -> f64 {
        (self.firing_rate(pressure_bar, rated_pressure_bar, setting) * dt.max(0.0))
            .min(tender_coal_kg.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_in_drive() {
        let stoker = Stoker::default();
        assert!((stoker.firing_rate(14.0, 14.0, 1.0) - 2.0).abs() < 1e-12);
        assert!((stoker.firing_rate(7.0, 14.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((stoker.firing_rate(14.0, 14.0, 0.5) - 0.5).abs() < 1e-12);
        assert_eq!(stoker.firing_rate(0.0, 14.0, 1.0), 0.0);
    }

    #[test]
    fn overpressure_does_not_overfeed() {
        let stoker = Stoker::default();
        assert!((stoker.firing_rate(20.0, 14.0, 1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn tender_limits_feed() {
        let stoker = Stoker::default();
        assert!((stoker.feed(14.0, 14.0, 1.0, 10.0, 3.0) - 3.0).abs() < 1e-12);
        assert!((stoker.feed(14.0, 14.0, 1.0, 1.0, 100.0) - 2.0).abs() < 1e-12);
    }
}
