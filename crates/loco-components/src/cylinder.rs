//! Double-acting cylinders: piston kinematics, power ratio and steam use.
//!
//! Each cylinder has a front and a rear chamber. A chamber is admitted
//! (pressurized) while its piston travels up to the cutoff point and then
//! expands adiabatically until either the stroke ends or the steam would
//! condense. A chamber that was never admitted produces no work; that
//! hysteresis lives in [`CylinderState`].

use crate::common::{check_fraction, check_non_negative, check_positive};
use crate::error::{ComponentError, ComponentResult};
use loco_core::CriticallyDamped;
use loco_core::units::constants::CELSIUS_TO_KELVIN;
use loco_steam::saturation;
use std::f64::consts::PI;

/// Mean of a half sine wave; leverage is normalized so it averages to one.
const SINUSOID_AVERAGE: f64 = 2.0 / PI;

/// Longest rotation span covered by one trapezoid panel.
const MAX_PANEL_REVOLUTIONS: f64 = 1.0 / 16.0;
/// Past this many panels (256 revolutions at full resolution) panels widen.
const MAX_PANELS: usize = 4096;

/// Cylinder parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinders {
    pub count: usize,
    /// Swept volume per chamber (L)
    pub volume_l: f64,
    pub min_cutoff: f64,
    pub max_cutoff: f64,
    pub cutoff_gamma: f64,
    pub adiabatic_index: f64,
    /// Exhaust temperature below which expanding steam condenses (K)
    pub min_steam_temp_k: f64,
    /// Power at full boiler pressure, full regulator and ratio 1 (kW)
    pub rated_power_kw: f64,
    /// Fraction of the admitted steam that is actually drawn from the boiler
    pub draw_ratio: f64,
    pub consumption_multiplier: f64,
    /// Power ramp smoothing time (s); zero applies the target directly
    pub power_smoothing_s: f64,
    /// Regulator opening below which the chambers are considered shut off
    pub regulator_closed: f64,
}

impl Default for Cylinders {
    fn default() -> Self {
        Self {
            count: 2,
            volume_l: 282.0,
            min_cutoff: 0.06,
            max_cutoff: 0.9,
            cutoff_gamma: 1.0,
            adiabatic_index: 1.33,
            min_steam_temp_k: 380.0,
            rated_power_kw: 2_000.0,
            draw_ratio: 0.7,
            consumption_multiplier: 1.0,
            power_smoothing_s: 0.5,
            regulator_closed: 0.01,
        }
    }
}

/// Piston kinematics for one cylinder at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PistonPhase {
    /// Fraction of the stroke travelled, 0 at dead centre
    pub position: f64,
    /// Fraction of the current half-revolution, in [0, 0.5)
    pub stroke: f64,
    /// True while the front chamber is the working side
    pub front: bool,
}

impl PistonPhase {
    /// Crank leverage relative to its mean over a stroke.
    pub fn leverage(&self) -> f64 {
        (2.0 * PI * self.stroke).sin() / SINUSOID_AVERAGE
    }
}

/// Admission flags and power ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderState {
    pub front: Vec<bool>,
    pub rear: Vec<bool>,
    pub power: CriticallyDamped,
}

impl CylinderState {
    pub fn new(count: usize) -> Self {
        Self {
            front: vec![false; count],
            rear: vec![false; count],
            power: CriticallyDamped::default(),
        }
    }

    pub fn is_pressurized(&self, cylinder: usize, front: bool) -> bool {
        let flags = if front { &self.front } else { &self.rear };
        flags.get(cylinder).copied().unwrap_or(false)
    }

    fn set_pressurized(&mut self, cylinder: usize, front: bool, value: bool) {
        let flags = if front {
            &mut self.front
        } else {
            &mut self.rear
        };
        if let Some(flag) = flags.get_mut(cylinder) {
            *flag = value;
        }
    }

    /// Mark every chamber unpressurized.
    pub fn vent_all(&mut self) {
        self.front.iter_mut().for_each(|f| *f = false);
        self.rear.iter_mut().for_each(|f| *f = false);
    }

    pub fn power_kw(&self) -> f64 {
        self.power.value
    }
}

impl Cylinders {
    /// Create a cylinder set with `count` cylinders of `volume_l` litres.
    pub fn new(count: usize, volume_l: f64, rated_power_kw: f64) -> ComponentResult<Self> {
        let cylinders = Self {
            count,
            volume_l,
            rated_power_kw,
            ..Self::default()
        };
        cylinders.validate()?;
        Ok(cylinders)
    }

    pub fn with_cutoff_range(mut self, min: f64, max: f64) -> Self {
        self.min_cutoff = min;
        self.max_cutoff = max;
        self
    }

    pub fn with_power_smoothing(mut self, seconds: f64) -> Self {
        self.power_smoothing_s = seconds;
        self
    }

    pub fn validate(&self) -> ComponentResult<()> {
        if self.count == 0 {
            return Err(ComponentError::InvalidArg {
                what: "cylinder count",
            });
        }
        check_positive(self.volume_l, "cylinder volume")?;
        check_fraction(self.min_cutoff, "minimum cutoff")?;
        check_fraction(self.max_cutoff, "maximum cutoff")?;
        if self.min_cutoff > self.max_cutoff {
            return Err(ComponentError::InvalidArg {
                what: "cutoff range",
            });
        }
        check_positive(self.cutoff_gamma, "cutoff gamma")?;
        check_positive(self.adiabatic_index - 1.0, "adiabatic index")?;
        check_positive(self.min_steam_temp_k, "minimum steam temperature")?;
        check_non_negative(self.rated_power_kw, "rated power")?;
        check_fraction(self.draw_ratio, "draw ratio")?;
        check_positive(self.consumption_multiplier, "steam consumption multiplier")?;
        check_non_negative(self.power_smoothing_s, "power smoothing time")?;
        check_non_negative(self.regulator_closed, "regulator closed threshold")?;
        Ok(())
    }

    pub fn new_state(&self) -> CylinderState {
        CylinderState::new(self.count)
    }

    /// Cutoff fraction for a reverser/cutoff lever position in [0, 1].
    pub fn cutoff(&self, lever: f64) -> f64 {
        let lever = lever.abs().min(1.0);
        (lever.powf(self.cutoff_gamma) * self.max_cutoff).max(self.min_cutoff)
    }

    /// Kinematics of cylinder `index` at `rotation` revolutions.
    ///
    /// Cylinders are spaced evenly over half a revolution.
    pub fn piston(&self, index: usize, rotation: f64) -> PistonPhase {
        let offset = index as f64 / (2.0 * self.count as f64);
        let phase = (rotation + offset).rem_euclid(1.0);
        let stroke = phase.rem_euclid(0.5);
        PistonPhase {
            position: 0.5 * (1.0 - (2.0 * PI * stroke).cos()),
            stroke,
            front: phase < 0.5,
        }
    }

    /// Rotation (revolutions) from dead centre while a chamber is admitting
    /// at `cutoff`.
    pub fn admission_window(&self, cutoff: f64) -> f64 {
        (1.0 - 2.0 * cutoff.clamp(0.0, 1.0)).acos() / (2.0 * PI)
    }

    /// Largest expansion ratio before steam at `steam_temp_c` condenses.
    pub fn condensation_expansion_limit(&self, steam_temp_c: f64) -> f64 {
        let t_k = (steam_temp_c + CELSIUS_TO_KELVIN).max(0.0);
        (t_k / self.min_steam_temp_k).powf(1.0 / (self.adiabatic_index - 1.0))
    }

    fn chamber_ratio(
        &self,
        state: &mut CylinderState,
        index: usize,
        cutoff: f64,
        rotation: f64,
        max_expansion: f64,
    ) -> f64 {
        let piston = self.piston(index, rotation);
        let pressure_ratio = if piston.position <= cutoff {
            state.set_pressurized(index, piston.front, true);
            1.0
        } else {
            let expansion = piston.position / cutoff;
            if state.is_pressurized(index, piston.front) && expansion <= max_expansion {
                expansion.powf(-self.adiabatic_index)
            } else {
                state.set_pressurized(index, piston.front, false);
                0.0
            }
        };
        pressure_ratio * piston.leverage()
    }

    /// Mean power ratio over all cylinders at one rotation.
    ///
    /// Updates the admission flags as a side effect.
    pub fn instantaneous_power_ratio(
        &self,
        state: &mut CylinderState,
        regulator: f64,
        cutoff: f64,
        rotation: f64,
        max_expansion: f64,
    ) -> f64 {
        if regulator < self.regulator_closed {
            state.vent_all();
        }
        let cutoff = cutoff.max(self.min_cutoff);
        let total: f64 = (0..self.count)
            .map(|i| self.chamber_ratio(state, i, cutoff, rotation, max_expansion))
            .sum();
        total / self.count as f64
    }

    /// Average power ratio while the wheels turn from `start_rotation` by
    /// `rotation_delta` revolutions.
    ///
    /// Composite trapezoid sampled in order of travel. Panels are no wider
    /// than 1/16 revolution or the admission window, so every chamber is
    /// sampled while admitting, whatever the span.
    pub fn average_power_ratio(
        &self,
        state: &mut CylinderState,
        regulator: f64,
        cutoff: f64,
        start_rotation: f64,
        rotation_delta: f64,
        max_expansion: f64,
    ) -> f64 {
        let width = MAX_PANEL_REVOLUTIONS.min(self.admission_window(cutoff.max(self.min_cutoff)));
        let panels = ((rotation_delta.abs() / width).ceil() as usize).clamp(1, MAX_PANELS);
        let step = rotation_delta / panels as f64;

        let mut sum = 0.0;
        for k in 0..=panels {
            let weight = if k == 0 || k == panels { 0.5 } else { 1.0 };
            let rotation = start_rotation + step * k as f64;
            sum += weight
                * self.instantaneous_power_ratio(state, regulator, cutoff, rotation, max_expansion);
        }
        sum / panels as f64
    }

    /// Steam chest pressure (bar) behind the regulator.
    pub fn steam_chest_pressure(&self, boiler_pressure_bar: f64, regulator: f64) -> f64 {
        boiler_pressure_bar.max(0.0) * regulator.clamp(0.0, 1.0)
    }

    /// Steam admitted to the cylinders (kg/s).
    pub fn steam_mass_flow(
        &self,
        revolutions_per_s: f64,
        regulator: f64,
        cutoff: f64,
        chest_pressure_bar: f64,
    ) -> f64 {
        if regulator <= 0.0 || chest_pressure_bar <= 0.0 {
            return 0.0;
        }
        let strokes_per_s = revolutions_per_s.abs() * 2.0 * self.count as f64;
        let density_kg_l = saturation::steam_density(chest_pressure_bar) / 1000.0;
        strokes_per_s * self.volume_l * cutoff * density_kg_l
    }

    /// Steam taken from the boiler (kg) for a cylinder flow over `dt`.
    pub fn boiler_draw(&self, steam_flow_kg_s: f64, dt: f64) -> f64 {
        steam_flow_kg_s * self.draw_ratio * self.consumption_multiplier * dt
    }

    /// Target output power (kW).
    pub fn power_target(
        &self,
        boiler_pressure_bar: f64,
        rated_pressure_bar: f64,
        regulator: f64,
        power_ratio: f64,
    ) -> f64 {
        if rated_pressure_bar <= 0.0 {
            return 0.0;
        }
        let chest_ratio = self.steam_chest_pressure(boiler_pressure_bar, regulator) / rated_pressure_bar;
        chest_ratio * power_ratio * self.rated_power_kw
    }

    /// Advance the power ramp toward `target_kw` and return it.
    pub fn smoothed_power(&self, state: &mut CylinderState, target_kw: f64, dt: f64) -> f64 {
        if self.power_smoothing_s <= 0.0 {
            state.power.reset(target_kw);
            return target_kw;
        }
        state.power.update(target_kw, self.power_smoothing_s, dt)
    }
}
