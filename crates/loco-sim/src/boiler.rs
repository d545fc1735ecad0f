//! Boiler water/steam equilibrium.
//!
//! The boiler holds a mass of water at one temperature and a steam space
//! treated as an ideal gas at that same temperature. Each update mixes in any
//! feedwater, adds the heat from the fire and then finds how much water boils
//! off (or steam condenses) so that the water ends up at the boiling point of
//! the resulting pressure.
//!
//! Water mass is the conserved quantity. Water volume and steam mass are
//! derived from it, the temperature and the pressure.

use crate::error::{SimError, SimResult};
use loco_core::Exponential;
use loco_core::units::{Pressure, Temperature, Volume, bar, celsius, liters};
use loco_steam::{SaturationPoint, ideal_gas, saturation};
use tracing::debug;

const LITERS_PER_M3: f64 = 1000.0;
/// Steam space never shrinks below this for the pressure calculation (m³).
const MIN_STEAM_VOLUME_M3: f64 = 1.0e-3;

/// Bisection settings for the phase-change search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumSolver {
    pub max_iterations: usize,
    /// Stop when the bracket is narrower than this fraction of the guess
    pub rel_tol: f64,
    /// Stop when the bracket is narrower than this (kg)
    pub abs_tol_kg: f64,
}

impl Default for EquilibriumSolver {
    fn default() -> Self {
        Self {
            max_iterations: 40,
            rel_tol: 1e-4,
            abs_tol_kg: 1e-9,
        }
    }
}

impl EquilibriumSolver {
    /// Run to the iteration cap with no early exit.
    pub fn exhaustive(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            rel_tol: 0.0,
            abs_tol_kg: 0.0,
        }
    }

    fn validate(&self) -> SimResult<()> {
        if self.max_iterations == 0 {
            return Err(SimError::InvalidArg {
                what: "solver max_iterations must be positive",
            });
        }
        if !(self.rel_tol >= 0.0 && self.abs_tol_kg >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "solver tolerances must be non-negative",
            });
        }
        Ok(())
    }
}

/// How an update resolved the phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveBranch {
    /// Already in equilibrium with nothing added
    Idle,
    /// Near-atmospheric pressure: the full limit is committed directly
    Direct,
    Bisection,
}

/// Result of one equilibrium update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseChange {
    /// Water boiled off (kg); negative when steam condensed
    pub evaporated_kg: f64,
    pub iterations: usize,
    pub converged: bool,
    pub branch: SolveBranch,
}

impl PhaseChange {
    fn idle() -> Self {
        Self {
            evaporated_kg: 0.0,
            iterations: 0,
            converged: true,
            branch: SolveBranch::Idle,
        }
    }
}

/// State of the boiler contents.
#[derive(Debug, Clone, PartialEq)]
pub struct BoilerState {
    /// Gauge pressure (bar)
    pub pressure_bar: f64,
    pub water_kg: f64,
    pub water_temp_c: f64,
    /// Evaporation rate (kg/s), smoothed for display
    pub evaporation: Exponential,
}

impl BoilerState {
    pub fn pressure(&self) -> Pressure {
        bar(self.pressure_bar)
    }

    pub fn water_temperature(&self) -> Temperature {
        celsius(self.water_temp_c)
    }

    pub fn evaporation_rate_kg_s(&self) -> f64 {
        self.evaporation.value
    }
}

/// Boiler parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Boiler {
    /// Nominal water capacity (L)
    pub capacity_l: f64,
    /// Shell volume as a multiple of the water capacity
    pub shell_factor: f64,
    pub feedwater_temp_c: f64,
    /// Below this pressure (bar) the phase change is committed without search
    pub direct_below_bar: f64,
    /// Time constant of the displayed evaporation rate (s)
    pub evaporation_smoothing_s: f64,
    pub solver: EquilibriumSolver,
}

impl Default for Boiler {
    fn default() -> Self {
        Self {
            capacity_l: 10_000.0,
            shell_factor: 1.05,
            feedwater_temp_c: 15.0,
            direct_below_bar: 0.05,
            evaporation_smoothing_s: 1.0,
            solver: EquilibriumSolver::default(),
        }
    }
}

impl Boiler {
    pub fn new(capacity_l: f64) -> SimResult<Self> {
        let boiler = Self {
            capacity_l,
            ..Self::default()
        };
        boiler.validate()?;
        Ok(boiler)
    }

    pub fn with_solver(mut self, solver: EquilibriumSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.capacity_l.is_finite() && self.capacity_l > 0.0) {
            return Err(SimError::InvalidArg {
                what: "boiler capacity must be positive",
            });
        }
        if !(self.shell_factor.is_finite() && self.shell_factor >= 1.0) {
            return Err(SimError::InvalidArg {
                what: "boiler shell factor must be at least 1",
            });
        }
        if !self.feedwater_temp_c.is_finite() {
            return Err(SimError::InvalidArg {
                what: "feedwater temperature must be finite",
            });
        }
        if !(self.direct_below_bar >= 0.0 && self.evaporation_smoothing_s >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "boiler thresholds must be non-negative",
            });
        }
        self.solver.validate()
    }

    /// Boiler at `pressure_bar` holding `water_volume_l` at its boiling point.
    pub fn hot(&self, pressure_bar: f64, water_volume_l: f64) -> BoilerState {
        let pressure_bar = pressure_bar.max(0.0);
        let t = saturation::boiling_point(pressure_bar);
        BoilerState {
            pressure_bar,
            water_kg: water_volume_l.max(0.0) * water_density_kg_l(t),
            water_temp_c: t,
            evaporation: Exponential::default(),
        }
    }

    /// Boiler filled with feedwater at zero gauge pressure.
    pub fn cold(&self, water_volume_l: f64) -> BoilerState {
        let t = self.feedwater_temp_c;
        BoilerState {
            pressure_bar: 0.0,
            water_kg: water_volume_l.max(0.0) * water_density_kg_l(t),
            water_temp_c: t,
            evaporation: Exponential::default(),
        }
    }

    pub fn shell_volume_l(&self) -> f64 {
        self.capacity_l * self.shell_factor
    }

    fn water_volume_at(&self, water_kg: f64, t_c: f64) -> f64 {
        water_kg.max(0.0) / water_density_kg_l(t_c)
    }

    fn steam_volume_at(&self, water_kg: f64, t_c: f64) -> f64 {
        ((self.shell_volume_l() - self.water_volume_at(water_kg, t_c)) / LITERS_PER_M3)
            .max(MIN_STEAM_VOLUME_M3)
    }

    /// Water level (L).
    pub fn water_volume_l(&self, state: &BoilerState) -> f64 {
        self.water_volume_at(state.water_kg, state.water_temp_c)
    }

    pub fn water_volume(&self, state: &BoilerState) -> Volume {
        liters(self.water_volume_l(state))
    }

    /// Steam space (m³).
    pub fn steam_volume_m3(&self, state: &BoilerState) -> f64 {
        self.steam_volume_at(state.water_kg, state.water_temp_c)
    }

    /// Steam mass (kg) from the ideal gas law.
    pub fn steam_mass_kg(&self, state: &BoilerState) -> f64 {
        ideal_gas::steam_mass_kg(
            state.pressure_bar,
            self.steam_volume_m3(state),
            state.water_temp_c,
        )
    }

    /// Total water plus steam (kg).
    pub fn total_mass_kg(&self, state: &BoilerState) -> f64 {
        state.water_kg + self.steam_mass_kg(state)
    }

    /// Mix in feedwater at [`Boiler::feedwater_temp_c`], apply `heat_kj` and
    /// settle the water/steam split.
    pub fn update(
        &self,
        state: &mut BoilerState,
        heat_kj: f64,
        water_added_kg: f64,
        dt: f64,
    ) -> PhaseChange {
        self.update_with_feedwater(state, heat_kj, water_added_kg, self.feedwater_temp_c, dt)
    }

    /// Mix in `water_added_kg` at `feedwater_temp_c`, apply `heat_kj` and
    /// settle the water/steam split.
    ///
    /// Heat only flows in: negative `heat_kj` is treated as zero. Cooling
    /// comes from feedwater and steam draws, which keeps the phase-change
    /// search bracketed.
    pub fn update_with_feedwater(
        &self,
        state: &mut BoilerState,
        heat_kj: f64,
        water_added_kg: f64,
        feedwater_temp_c: f64,
        dt: f64,
    ) -> PhaseChange {
        let heat_kj = heat_kj.max(0.0);
        if water_added_kg > 0.0 {
            let steam_kg = self.steam_mass_kg(state);
            let total = state.water_kg.max(0.0) + water_added_kg;
            state.water_temp_c = (state.water_kg.max(0.0) * state.water_temp_c
                + water_added_kg * feedwater_temp_c)
                / total;
            state.water_kg = total;
            // Same steam, now cooler and in a smaller space
            state.pressure_bar =
                ideal_gas::pressure_bar(steam_kg, self.steam_volume_m3(state), state.water_temp_c);
        }

        let change = self.settle(state, heat_kj);

        if dt > 0.0 {
            state.evaporation.update(
                change.evaporated_kg / dt,
                self.evaporation_smoothing_s,
                dt,
            );
        }
        change
    }

    fn settle(&self, state: &mut BoilerState, heat_kj: f64) -> PhaseChange {
        let p = state.pressure_bar.max(0.0);
        let sat = SaturationPoint::at(p);
        let water_kg = state.water_kg.max(0.0);
        let steam_kg = self.steam_mass_kg(state);
        let t0 = state.water_temp_c;

        let heat_capacity =
            water_kg * sat.water_specific_heat + steam_kg * sat.steam_specific_heat;
        let excess =
            (t0 - sat.boiling_point_c) * water_kg * sat.water_specific_heat + heat_kj;
        let limit = excess / sat.latent_heat_kj_kg;

        if limit == 0.0 || heat_capacity <= 0.0 || !limit.is_finite() {
            return PhaseChange::idle();
        }

        // Temperature and pressure if `m` kg changed phase
        let trial = |m: f64| {
            let t = t0 + (heat_kj - m * sat.latent_heat_kj_kg) / heat_capacity;
            let steam_m3 = self.steam_volume_at(water_kg - m, t);
            (t, ideal_gas::pressure_bar(steam_kg + m, steam_m3, t))
        };

        // Cannot boil more water than exists or condense more steam than exists
        let mut lo = limit.min(0.0).max(-steam_kg);
        let mut hi = limit.max(0.0).min(water_kg);

        let (evaporated, iterations, converged, branch) = if p < self.direct_below_bar {
            (limit.clamp(-steam_kg, water_kg), 0, true, SolveBranch::Direct)
        } else {
            let mut iterations = 0;
            let mut converged = false;
            while iterations < self.solver.max_iterations {
                let guess = 0.5 * (lo + hi);
                let (t, p_guess) = trial(guess);
                if t < saturation::boiling_point(p_guess) {
                    // Boiled off too much: the water fell below saturation
                    hi = guess;
                } else {
                    lo = guess;
                }
                iterations += 1;
                let tol = (self.solver.rel_tol * guess.abs()).max(self.solver.abs_tol_kg);
                if hi - lo <= tol {
                    converged = true;
                    break;
                }
            }
            if !converged {
                debug!(
                    iterations,
                    bracket_kg = hi - lo,
                    pressure_bar = p,
                    "boiler equilibrium stopped at iteration cap"
                );
            }
            (0.5 * (lo + hi), iterations, converged, SolveBranch::Bisection)
        };

        let (t, p_new) = trial(evaporated);
        state.water_kg = (water_kg - evaporated).max(0.0);
        state.water_temp_c = t;
        state.pressure_bar = p_new.max(0.0);

        PhaseChange {
            evaporated_kg: evaporated,
            iterations,
            converged,
            branch,
        }
    }

    /// Remove up to `mass_kg` of steam at constant temperature; returns the
    /// mass actually drawn.
    pub fn draw_steam(&self, state: &mut BoilerState, mass_kg: f64) -> f64 {
        if !(mass_kg > 0.0) || state.pressure_bar <= 0.0 {
            return 0.0;
        }
        let steam_kg = self.steam_mass_kg(state);
        if steam_kg <= 0.0 {
            return 0.0;
        }
        let drawn = mass_kg.min(steam_kg);
        state.pressure_bar = (state.pressure_bar * (1.0 - drawn / steam_kg)).max(0.0);
        drawn
    }

    /// Lose `pressure_bar` of pressure through leaks, never going negative.
    pub fn leak(&self, state: &mut BoilerState, pressure_bar: f64) {
        if pressure_bar > 0.0 {
            state.pressure_bar = (state.pressure_bar - pressure_bar).max(0.0);
        }
    }

    /// Drain up to `mass_kg` of water through the blowdown; returns the mass
    /// drained. The steam keeps its mass and expands into the freed space.
    pub fn drain_water(&self, state: &mut BoilerState, mass_kg: f64) -> f64 {
        if !(mass_kg > 0.0) || state.water_kg <= 0.0 {
            return 0.0;
        }
        let steam_kg = self.steam_mass_kg(state);
        let drained = mass_kg.min(state.water_kg);
        state.water_kg -= drained;
        state.pressure_bar =
            ideal_gas::pressure_bar(steam_kg, self.steam_volume_m3(state), state.water_temp_c)
                .max(0.0);
        drained
    }

    /// Room left for water before the nominal capacity (L).
    pub fn headroom_l(&self, state: &BoilerState) -> f64 {
        (self.capacity_l - self.water_volume_l(state)).max(0.0)
    }
}

/// Water density (kg/L) at a temperature, held inside the calibrated range.
fn water_density_kg_l(t_c: f64) -> f64 {
    saturation::water_density_at_temperature(saturation::clamp_to_calibration(t_c))
        / LITERS_PER_M3
}
