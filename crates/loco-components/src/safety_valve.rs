//! Two-stage boiler safety valve.
//!
//! The first stage lifts at the set pressure and reseats after the pressure
//! falls by the blowdown. A second stage lifts slightly higher. Just below
//! each lift pressure the valve feathers (weeps) a little.

use crate::common::{check_non_negative, check_positive};
use crate::error::ComponentResult;
use loco_core::{CriticallyDamped, inverse_lerp, lerp};

/// Openings below this are treated as shut.
const MIN_OPENING: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct SafetyValve {
    /// First-stage lift pressure (bar)
    pub threshold_bar: f64,
    /// Drop below the lift pressure before a stage reseats (bar)
    pub blowdown_bar: f64,
    /// Second-stage lift above the first (bar)
    pub secondary_offset_bar: f64,
    /// Pressure band below each lift pressure in which the valve weeps (bar)
    pub feathering_bar: f64,
    /// Opening reached at the top of the feathering band
    pub feathering_amount: f64,
    /// Closing ramp time (s)
    pub closing_smoothing_s: f64,
    /// Steam vented when fully open (kg/s)
    pub vent_rate_kg_s: f64,
}

impl Default for SafetyValve {
    fn default() -> Self {
        Self {
            threshold_bar: 14.0,
            blowdown_bar: 0.35,
            secondary_offset_bar: 0.15,
            feathering_bar: 0.15,
            feathering_amount: 0.05,
            closing_smoothing_s: 1.0,
            vent_rate_kg_s: 12.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafetyValveState {
    /// Stages lifted: 0, 1 or 2
    pub stages_open: u8,
    pub opening: CriticallyDamped,
}

impl SafetyValveState {
    pub fn opening(&self) -> f64 {
        self.opening.value
    }
}

impl SafetyValve {
    pub fn new(threshold_bar: f64, vent_rate_kg_s: f64) -> ComponentResult<Self> {
        let valve = Self {
            threshold_bar,
            vent_rate_kg_s,
            ..Self::default()
        };
        valve.validate()?;
        Ok(valve)
    }

    pub fn validate(&self) -> ComponentResult<()> {
        check_positive(self.threshold_bar, "safety valve threshold")?;
        check_non_negative(self.blowdown_bar, "safety valve blowdown")?;
        check_non_negative(self.secondary_offset_bar, "safety valve second stage offset")?;
        check_non_negative(self.feathering_bar, "safety valve feathering band")?;
        check_non_negative(self.feathering_amount, "safety valve feathering amount")?;
        check_non_negative(self.closing_smoothing_s, "safety valve smoothing")?;
        check_non_negative(self.vent_rate_kg_s, "safety valve vent rate")?;
        Ok(())
    }

    fn secondary_threshold(&self) -> f64 {
        self.threshold_bar + self.secondary_offset_bar
    }

    /// Stage count after observing `pressure_bar`. One transition per call.
    pub fn next_stage(&self, stages_open: u8, pressure_bar: f64) -> u8 {
        let secondary = self.secondary_threshold();
        match stages_open {
            0 if pressure_bar > self.threshold_bar => 1,
            0 => 0,
            1 if pressure_bar > secondary => 2,
            1 if pressure_bar < self.threshold_bar - self.blowdown_bar => 0,
            1 => 1,
            _ if pressure_bar < secondary - self.blowdown_bar => 1,
            _ => 2,
        }
    }

    /// Opening the valve is heading for at the current stage.
    pub fn target_opening(&self, stages_open: u8, pressure_bar: f64) -> f64 {
        let feather = |lift: f64, base: f64| {
            lerp(
                base,
                base + self.feathering_amount,
                inverse_lerp(lift - self.feathering_bar, lift, pressure_bar),
            )
        };
        match stages_open {
            0 => feather(self.threshold_bar, 0.0),
            1 => feather(self.secondary_threshold(), 0.5),
            _ => 1.0,
        }
    }

    /// Advance the valve and return its opening in [0, 1].
    ///
    /// Opening is immediate; closing follows a critically damped ramp.
    pub fn update(&self, state: &mut SafetyValveState, pressure_bar: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return state.opening.value;
        }
        state.stages_open = self.next_stage(state.stages_open, pressure_bar);
        let target = self.target_opening(state.stages_open, pressure_bar);

        if target >= state.opening.value {
            state.opening.reset(target);
        } else {
            state
                .opening
                .update(target, self.closing_smoothing_s, dt);
        }
        if state.opening.value < MIN_OPENING {
            state.opening.reset(0.0);
        }
        state.opening.value
    }

    /// Steam vented (kg) at `opening` over `dt`.
    pub fn vented_mass(&self, opening: f64, dt: f64) -> f64 {
        opening.clamp(0.0, 1.0) * self.vent_rate_kg_s * dt.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_lift_and_reseat_with_hysteresis() {
        let sv = SafetyValve::default();
        assert_eq!(sv.next_stage(0, 13.9), 0);
        assert_eq!(sv.next_stage(0, 14.01), 1);
        assert_eq!(sv.next_stage(1, 13.8), 1);
        assert_eq!(sv.next_stage(1, 13.6), 0);
        assert_eq!(sv.next_stage(1, 14.2), 2);
        assert_eq!(sv.next_stage(2, 13.9), 2);
        assert_eq!(sv.next_stage(2, 13.75), 1);
        // No cascade within a single step
        assert_eq!(sv.next_stage(0, 20.0), 1);
    }

    #[test]
    fn feathering_below_lift() {
        let sv = SafetyValve::default();
        assert_eq!(sv.target_opening(0, 13.0), 0.0);
        assert!((sv.target_opening(0, 13.925) - 0.025).abs() < 1e-9);
        assert!((sv.target_opening(0, 14.0) - 0.05).abs() < 1e-12);
        assert!((sv.target_opening(1, 13.0) - 0.5).abs() < 1e-12);
        assert_eq!(sv.target_opening(2, 0.0), 1.0);
    }

    #[test]
    fn opens_instantly_closes_gradually() {
        let sv = SafetyValve::default();
        let mut state = SafetyValveState::default();

        let opening = sv.update(&mut state, 14.1, 0.1);
        assert_eq!(state.stages_open, 1);
        assert!(opening >= 0.5);

        let opening = sv.update(&mut state, 14.3, 0.1);
        assert_eq!(state.stages_open, 2);
        assert_eq!(opening, 1.0);

        // Pressure collapses: stage drops but the opening ramps down
        let opening = sv.update(&mut state, 13.0, 0.1);
        assert_eq!(state.stages_open, 1);
        assert!(opening < 1.0 && opening > 0.5);

        for _ in 0..200 {
            sv.update(&mut state, 13.0, 0.1);
        }
        assert_eq!(state.stages_open, 0);
        assert_eq!(state.opening(), 0.0);
    }

    #[test]
    fn vented_mass_scales() {
        let sv = SafetyValve::default();
        assert!((sv.vented_mass(0.5, 2.0) - 12.0).abs() < 1e-12);
        assert_eq!(sv.vented_mass(1.0, -1.0), 0.0);
    }

    #[test]
    fn zero_dt_is_noop() {
        let sv = SafetyValve::default();
        let mut state = SafetyValveState::default();
        assert_eq!(sv.update(&mut state, 20.0, 0.0), 0.0);
        assert_eq!(state.stages_open, 0);
    }
}
