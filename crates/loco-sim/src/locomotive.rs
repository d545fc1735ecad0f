//! One locomotive: parameters, state and the per-tick step.

use crate::boiler::{Boiler, BoilerState, SolveBranch};
use crate::checks::{clamp_position, finite_input};
use crate::error::{SimError, SimResult};
use loco_components::{
    Blower, CylinderState, Cylinders, FireState, Firebox, Injector, SafetyValve,
    SafetyValveState, Stoker, firebox_temperature,
};
use loco_core::lerp;
use loco_core::units::{
    Mass, MassRate, Power, Pressure, Temperature, Volume, bar, celsius, kg, kgps, kw, liters,
};
use loco_steam::saturation;
use serde::Serialize;
use tracing::{trace, warn};

/// Damper position maps onto this range of draft.
const DAMPER_MIN_DRAFT: f64 = 0.05;
/// Water mass (kg) below which the boiler counts as dry.
const DRY_WATER_KG: f64 = 1.0;

/// Everything fixed about one locomotive.
#[derive(Debug, Clone, PartialEq)]
pub struct Locomotive {
    pub boiler: Boiler,
    pub firebox: Firebox,
    pub cylinders: Cylinders,
    pub injector: Injector,
    pub safety_valve: SafetyValve,
    pub stoker: Stoker,
    pub blower: Blower,
    /// Leakage at multiplier 1 (bar/s)
    pub base_leak_bar_s: f64,
    /// Blowdown drain with the water dump fully open (kg/s)
    pub water_dump_rate_kg_s: f64,
    /// Steam vented with the steam releaser fully open (kg/s)
    pub steam_release_rate_kg_s: f64,
}

impl Default for Locomotive {
    fn default() -> Self {
        Self {
            boiler: Boiler::default(),
            firebox: Firebox::default(),
            cylinders: Cylinders::default(),
            injector: Injector::default(),
            safety_valve: SafetyValve::default(),
            stoker: Stoker::default(),
            blower: Blower::default(),
            base_leak_bar_s: 0.003,
            water_dump_rate_kg_s: 13.3,
            steam_release_rate_kg_s: 5.0,
        }
    }
}

/// Per-locomotive mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct LocoState {
    pub boiler: BoilerState,
    pub fire: FireState,
    pub cylinders: CylinderState,
    pub safety_valve: SafetyValveState,
    /// Cylinder steam flow from the last tick (kg/s), drives this tick's draft
    pub exhaust_flow_kg_s: f64,
}

/// Controls and external supplies for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickInputs {
    pub dt: f64,
    pub regulator: f64,
    /// Cutoff/reverser lever
    pub cutoff: f64,
    pub damper: f64,
    pub injector: f64,
    pub blower: f64,
    pub stoker: f64,
    /// Coal shovelled this tick (kg)
    pub fuel_feed_kg: f64,
    /// Driving wheel position (revolutions)
    pub wheel_revolution: f64,
    /// Driving wheel speed (rev/s)
    pub rotation_speed: f64,
    pub tender_coal_kg: f64,
    pub tender_water_kg: f64,
    pub leak_multiplier: f64,
    /// Boiler blowdown valve
    pub water_dump: f64,
    pub steam_release: f64,
    /// Grate dump; 1 drops the fire at the full dump rate
    pub fire_dump: f64,
}

impl Default for TickInputs {
    fn default() -> Self {
        Self {
            dt: 0.0,
            regulator: 0.0,
            cutoff: 0.0,
            damper: 1.0,
            injector: 0.0,
            blower: 0.0,
            stoker: 0.0,
            fuel_feed_kg: 0.0,
            wheel_revolution: 0.0,
            rotation_speed: 0.0,
            tender_coal_kg: 0.0,
            tender_water_kg: 0.0,
            leak_multiplier: 1.0,
            water_dump: 0.0,
            steam_release: 0.0,
            fire_dump: 0.0,
        }
    }
}

/// Published results of one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickOutputs {
    pub pressure_bar: f64,
    pub water_level_l: f64,
    pub water_temp_c: f64,
    pub firebox_temp_c: f64,
    pub power_kw: f64,
    pub heat_yield_kw: f64,
    /// Steam taken by the cylinders this tick (kg)
    pub steam_consumed_kg: f64,
    pub steam_consumption_kg_s: f64,
    pub oxygen_availability: f64,
    pub smoothed_oxygen_availability: f64,
    pub oxygen_supply_kg_s: f64,
    pub exhaust_flow_kg_s: f64,
    pub coal_from_tender_kg: f64,
    pub water_from_tender_kg: f64,
    pub coal_burned_kg: f64,
    pub coal_dumped_kg: f64,
    pub coal_in_firebox_kg: f64,
    pub water_dumped_kg: f64,
    pub steam_released_kg: f64,
    pub evaporation_rate_kg_s: f64,
    pub safety_valve_opening: f64,
    pub safety_valve_vented_kg: f64,
    pub fire_lit: bool,
    pub cutoff: f64,
}

impl TickOutputs {
    pub fn pressure(&self) -> Pressure {
        bar(self.pressure_bar)
    }

    pub fn water_level(&self) -> Volume {
        liters(self.water_level_l)
    }

    pub fn water_temperature(&self) -> Temperature {
        celsius(self.water_temp_c)
    }

    pub fn power(&self) -> Power {
        kw(self.power_kw)
    }

    pub fn steam_consumption(&self) -> MassRate {
        kgps(self.steam_consumption_kg_s)
    }

    pub fn steam_consumed(&self) -> Mass {
        kg(self.steam_consumed_kg)
    }

    pub fn coal_burned(&self) -> Mass {
        kg(self.coal_burned_kg)
    }
}

impl Locomotive {
    pub fn validate(&self) -> SimResult<()> {
        self.boiler.validate()?;
        self.firebox.validate()?;
        self.cylinders.validate()?;
        self.injector.validate()?;
        self.safety_valve.validate()?;
        if !(self.stoker.max_firing_rate_kg_s >= 0.0 && self.blower.max_rate_kg_s >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "stoker and blower rates must be non-negative",
            });
        }
        if !(self.base_leak_bar_s.is_finite() && self.base_leak_bar_s >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "base leak must be non-negative",
            });
        }
        if !(self.water_dump_rate_kg_s >= 0.0 && self.steam_release_rate_kg_s >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "dump and release rates must be non-negative",
            });
        }
        Ok(())
    }

    /// Engine in steam: boiler at `pressure_bar`, `coal_kg` burning.
    pub fn hot_state(&self, pressure_bar: f64, water_volume_l: f64, coal_kg: f64) -> LocoState {
        self.state_with(
            self.boiler.hot(pressure_bar, water_volume_l),
            FireState::new(coal_kg, coal_kg > 0.0),
        )
    }

    /// Dead engine: cold water, zero pressure, unlit coal on the grate.
    pub fn cold_state(&self, water_volume_l: f64, coal_kg: f64) -> LocoState {
        self.state_with(
            self.boiler.cold(water_volume_l),
            FireState::new(coal_kg, false),
        )
    }

    fn state_with(&self, boiler: BoilerState, fire: FireState) -> LocoState {
        LocoState {
            boiler,
            fire,
            cylinders: self.cylinders.new_state(),
            safety_valve: SafetyValveState::default(),
            exhaust_flow_kg_s: 0.0,
        }
    }

    /// Pressure the power and stoker figures are rated at (bar).
    pub fn rated_pressure_bar(&self) -> f64 {
        self.safety_valve.threshold_bar
    }

    /// Advance `state` by one tick.
    ///
    /// Returns `Ok(None)` and leaves the state untouched when `dt <= 0`.
    pub fn tick(&self, state: &mut LocoState, inputs: &TickInputs) -> SimResult<Option<TickOutputs>> {
        let dt = finite_input(inputs.dt, "dt")?;
        check_inputs(inputs)?;
        if dt <= 0.0 {
            return Ok(None);
        }

        let was_dry = state.boiler.water_kg < DRY_WATER_KG;
        let mut out = TickOutputs::default();

        // Fire
        let pressure = state.boiler.pressure_bar;
        let blower_flow = self.blower.steam_flow(clamp_position(inputs.blower), pressure);
        self.boiler.draw_steam(&mut state.boiler, blower_flow * dt);
        let exhaust = state.exhaust_flow_kg_s + blower_flow;
        let damper = lerp(DAMPER_MIN_DRAFT, 1.0, clamp_position(inputs.damper));
        out.oxygen_supply_kg_s = self
            .firebox
            .set_oxygen_supply(&mut state.fire, exhaust, damper, dt);
        out.exhaust_flow_kg_s = exhaust;

        let boiling_point = saturation::boiling_point(pressure);
        let previous_firebox_temp = firebox_temperature(boiling_point, state.fire.heat_yield_kw());
        let stoked = self.stoker.feed(
            pressure,
            self.rated_pressure_bar(),
            clamp_position(inputs.stoker),
            dt,
            inputs.tender_coal_kg / self.firebox.coal_consumption_multiplier,
        );
        let fuel = self.firebox.add_fuel_from_tender(
            &mut state.fire,
            inputs.fuel_feed_kg.max(0.0) + stoked,
            inputs.tender_coal_kg,
            previous_firebox_temp,
        );
        out.coal_from_tender_kg = fuel.from_tender_kg;
        out.coal_dumped_kg = self
            .firebox
            .dump(&mut state.fire, clamp_position(inputs.fire_dump), dt);
        out.coal_burned_kg = self.firebox.burn(&mut state.fire, dt);
        let heat_kw = self.firebox.smoothed_heat_yield_rate(&mut state.fire, dt);

        // Water
        let water_volume = self.boiler.water_volume_l(&state.boiler);
        let headroom = self
            .injector
            .headroom_kg(self.boiler.capacity_l, water_volume);
        let water = self.injector.transfer(
            clamp_position(inputs.injector),
            dt,
            inputs.tender_water_kg,
            headroom,
        );
        out.water_from_tender_kg = water.from_tender_kg;
        let drain = self.water_dump_rate_kg_s * clamp_position(inputs.water_dump) * dt;
        out.water_dumped_kg = self.boiler.drain_water(&mut state.boiler, drain);

        // Boiler
        out.firebox_temp_c = firebox_temperature(boiling_point, heat_kw);
        let change = self.boiler.update_with_feedwater(
            &mut state.boiler,
            heat_kw * dt,
            water.into_boiler_kg,
            water.feedwater_temp_c,
            dt,
        );

        // Cylinders
        let regulator = clamp_position(inputs.regulator);
        let cutoff = self.cylinders.cutoff(inputs.cutoff);
        let pressure = state.boiler.pressure_bar;
        let steam_temp = out.firebox_temp_c.max(saturation::boiling_point(pressure));
        let max_expansion = self.cylinders.condensation_expansion_limit(steam_temp);
        let power_ratio = self.cylinders.average_power_ratio(
            &mut state.cylinders,
            regulator,
            cutoff,
            inputs.wheel_revolution,
            inputs.rotation_speed * dt,
            max_expansion,
        );
        let target = self.cylinders.power_target(
            pressure,
            self.rated_pressure_bar(),
            regulator,
            power_ratio,
        );
        out.power_kw = self
            .cylinders
            .smoothed_power(&mut state.cylinders, target, dt);

        let chest = self.cylinders.steam_chest_pressure(pressure, regulator);
        let steam_flow = self
            .cylinders
            .steam_mass_flow(inputs.rotation_speed, regulator, cutoff, chest);
        let wanted = self.cylinders.boiler_draw(steam_flow, dt);
        out.steam_consumed_kg = self.boiler.draw_steam(&mut state.boiler, wanted);
        out.steam_consumption_kg_s = out.steam_consumed_kg / dt;
        state.exhaust_flow_kg_s = steam_flow;

        // Safety valve
        let opening = self
            .safety_valve
            .update(&mut state.safety_valve, state.boiler.pressure_bar, dt);
        let vent = self.safety_valve.vented_mass(opening, dt);
        out.safety_valve_vented_kg = self.boiler.draw_steam(&mut state.boiler, vent);
        out.safety_valve_opening = opening;

        // Steam releaser and leakage
        let release = self.steam_release_rate_kg_s * clamp_position(inputs.steam_release) * dt;
        out.steam_released_kg = self.boiler.draw_steam(&mut state.boiler, release);
        let leak = self.base_leak_bar_s * inputs.leak_multiplier.max(0.0) * dt;
        self.boiler.leak(&mut state.boiler, leak);

        out.pressure_bar = state.boiler.pressure_bar;
        out.water_level_l = self.boiler.water_volume_l(&state.boiler);
        out.water_temp_c = state.boiler.water_temp_c;
        out.heat_yield_kw = heat_kw;
        out.oxygen_availability = state.fire.oxygen_availability;
        out.smoothed_oxygen_availability = state.fire.smoothed_oxygen.value;
        out.coal_in_firebox_kg = state.fire.coal_kg;
        out.evaporation_rate_kg_s = state.boiler.evaporation_rate_kg_s();
        out.fire_lit = state.fire.lit;
        out.cutoff = cutoff;

        if !was_dry && state.boiler.water_kg < DRY_WATER_KG {
            warn!(
                water_kg = state.boiler.water_kg,
                pressure_bar = out.pressure_bar,
                "boiler has run dry"
            );
        }
        trace!(
            pressure_bar = out.pressure_bar,
            water_level_l = out.water_level_l,
            power_kw = out.power_kw,
            heat_kw = out.heat_yield_kw,
            evaporated_kg = change.evaporated_kg,
            solver_iterations = change.iterations,
            direct = change.branch == SolveBranch::Direct,
            "tick"
        );

        Ok(Some(out))
    }
}

fn check_inputs(inputs: &TickInputs) -> SimResult<()> {
    finite_input(inputs.regulator, "regulator")?;
    finite_input(inputs.cutoff, "cutoff")?;
    finite_input(inputs.damper, "damper")?;
    finite_input(inputs.injector, "injector")?;
    finite_input(inputs.blower, "blower")?;
    finite_input(inputs.stoker, "stoker")?;
    finite_input(inputs.fuel_feed_kg, "fuel feed")?;
    finite_input(inputs.wheel_revolution, "wheel revolution")?;
    finite_input(inputs.rotation_speed, "rotation speed")?;
    finite_input(inputs.tender_coal_kg, "tender coal")?;
    finite_input(inputs.tender_water_kg, "tender water")?;
    finite_input(inputs.leak_multiplier, "leak multiplier")?;
    finite_input(inputs.water_dump, "water dump")?;
    finite_input(inputs.steam_release, "steam release")?;
    finite_input(inputs.fire_dump, "fire dump")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_inputs(dt: f64) -> TickInputs {
        TickInputs {
            dt,
            leak_multiplier: 0.0,
            ..TickInputs::default()
        }
    }

    #[test]
    fn non_positive_dt_is_noop() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(10.0, 5000.0, 100.0);
        let before = state.clone();
        assert_eq!(loco.tick(&mut state, &idle_inputs(0.0)).unwrap(), None);
        assert_eq!(loco.tick(&mut state, &idle_inputs(-1.0)).unwrap(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn non_finite_input_rejected() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(10.0, 5000.0, 100.0);
        let inputs = TickInputs {
            regulator: f64::NAN,
            ..idle_inputs(0.1)
        };
        assert!(matches!(
            loco.tick(&mut state, &inputs),
            Err(SimError::InvalidArg { what: "regulator" })
        ));
        let inputs = TickInputs {
            dt: f64::INFINITY,
            ..idle_inputs(0.1)
        };
        assert!(loco.tick(&mut state, &inputs).is_err());
    }

    #[test]
    fn cold_dead_engine_stays_put() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(10.0, 5000.0, 0.0);
        let out = loco.tick(&mut state, &idle_inputs(1.0)).unwrap().unwrap();
        assert!(((out.pressure_bar - 10.0) / 10.0).abs() < 1e-4);
        assert!(((out.water_level_l - 5000.0) / 5000.0).abs() < 1e-4);
        assert_eq!(out.power_kw, 0.0);
        assert!(!out.fire_lit);
    }

    #[test]
    fn shovelled_coal_comes_from_tender() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(10.0, 5000.0, 100.0);
        let inputs = TickInputs {
            fuel_feed_kg: 20.0,
            tender_coal_kg: 5.0,
            ..idle_inputs(0.1)
        };
        let out = loco.tick(&mut state, &inputs).unwrap().unwrap();
        assert!((out.coal_from_tender_kg - 5.0).abs() < 1e-12);
        assert!(out.coal_burned_kg > 0.0);
        assert!((state.fire.coal_kg - (105.0 - out.coal_burned_kg)).abs() < 1e-9);
    }

    #[test]
    fn injector_draws_tender_water() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(10.0, 5000.0, 0.0);
        let inputs = TickInputs {
            injector: 1.0,
            tender_water_kg: 1000.0,
            ..idle_inputs(0.5)
        };
        let out = loco.tick(&mut state, &inputs).unwrap().unwrap();
        assert!((out.water_from_tender_kg - 5.0).abs() < 1e-9);
        assert!(out.water_level_l > 5000.0);
        assert!(out.pressure_bar < 10.0);
    }

    #[test]
    fn working_engine_makes_power_and_uses_steam() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(12.0, 5000.0, 200.0);
        let mut inputs = TickInputs {
            regulator: 1.0,
            cutoff: 0.4,
            rotation_speed: 2.0,
            ..idle_inputs(0.05)
        };
        let mut last = None;
        for _ in 0..100 {
            let out = loco.tick(&mut state, &inputs).unwrap().unwrap();
            inputs.wheel_revolution += inputs.rotation_speed * inputs.dt;
            last = Some(out);
        }
        let out = last.unwrap();
        assert!(out.power_kw > 0.0);
        assert!(out.steam_consumed_kg > 0.0);
        assert!(out.exhaust_flow_kg_s > 0.0);
        assert!((out.cutoff - 0.36).abs() < 1e-12);
        assert!(out.pressure_bar < 12.0);
        assert!(state.exhaust_flow_kg_s > 0.0);
    }

    #[test]
    fn overpressure_lifts_safety_valve() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(14.5, 5000.0, 0.0);
        let out = loco.tick(&mut state, &idle_inputs(0.1)).unwrap().unwrap();
        assert!(out.safety_valve_opening > 0.5);
        assert!(out.safety_valve_vented_kg > 0.0);
        assert!(out.pressure_bar < 14.5);
        assert_eq!(state.safety_valve.stages_open, 1);
    }

    #[test]
    fn leak_multiplier_scales_pressure_loss() {
        let loco = Locomotive {
            base_leak_bar_s: 0.01,
            ..Locomotive::default()
        };
        let mut a = loco.hot_state(10.0, 5000.0, 0.0);
        let mut b = a.clone();
        let out_a = loco
            .tick(&mut a, &TickInputs { leak_multiplier: 1.0, ..idle_inputs(1.0) })
            .unwrap()
            .unwrap();
        let out_b = loco
            .tick(&mut b, &TickInputs { leak_multiplier: 3.0, ..idle_inputs(1.0) })
            .unwrap()
            .unwrap();
        assert!((out_a.pressure_bar - 9.99).abs() < 1e-9);
        assert!((out_b.pressure_bar - 9.97).abs() < 1e-9);
    }

    #[test]
    fn coal_multiplier_charges_tender() {
        let loco = Locomotive {
            firebox: Firebox::default().with_coal_consumption_multiplier(2.0),
            ..Locomotive::default()
        };
        let mut state = loco.hot_state(10.0, 5000.0, 100.0);
        let inputs = TickInputs {
            fuel_feed_kg: 20.0,
            tender_coal_kg: 10.0,
            ..idle_inputs(0.1)
        };
        let out = loco.tick(&mut state, &inputs).unwrap().unwrap();
        assert!((out.coal_from_tender_kg - 10.0).abs() < 1e-12);
        assert!((state.fire.coal_kg - (105.0 - out.coal_burned_kg)).abs() < 1e-9);
    }

    #[test]
    fn fire_dump_drops_the_fire() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(10.0, 5000.0, 15.0);
        let inputs = TickInputs {
            fire_dump: 1.0,
            ..idle_inputs(1.0)
        };
        let out = loco.tick(&mut state, &inputs).unwrap().unwrap();
        assert!((out.coal_dumped_kg - 10.0).abs() < 1e-12);
        assert!(out.fire_lit);

        let out = loco.tick(&mut state, &inputs).unwrap().unwrap();
        assert!(out.coal_dumped_kg > 0.0 && out.coal_dumped_kg <= 5.0);
        assert_eq!(out.coal_burned_kg, 0.0);
        assert_eq!(state.fire.coal_kg, 0.0);
        assert!(!out.fire_lit);
    }

    #[test]
    fn water_dump_drains_boiler() {
        let loco = Locomotive::default();
        let mut state = loco.hot_state(10.0, 5000.0, 0.0);
        let water = state.boiler.water_kg;
        let inputs = TickInputs {
            water_dump: 0.5,
            ..idle_inputs(1.0)
        };
        let out = loco.tick(&mut state, &inputs).unwrap().unwrap();
        assert!((out.water_dumped_kg - 6.65).abs() < 1e-9);
        assert!(out.water_level_l < 5000.0);
        assert!(state.boiler.water_kg < water);
    }

    #[test]
    fn steam_release_vents_pressure() {
        let loco = Locomotive::default();
        let mut shut = loco.hot_state(10.0, 5000.0, 0.0);
        let mut open = shut.clone();
        let out_shut = loco.tick(&mut shut, &idle_inputs(1.0)).unwrap().unwrap();
        let out_open = loco
            .tick(&mut open, &TickInputs { steam_release: 1.0, ..idle_inputs(1.0) })
            .unwrap()
            .unwrap();
        assert!((out_open.steam_released_kg - 5.0).abs() < 1e-9);
        assert_eq!(out_shut.steam_released_kg, 0.0);
        assert!(out_open.pressure_bar < out_shut.pressure_bar);
    }

    #[test]
    fn hot_feedwater_cools_less() {
        let cold_feed = Locomotive::default();
        let hot_feed = Locomotive {
            injector: Injector {
                feedwater_temp_c: 80.0,
                ..Injector::default()
            },
            ..Locomotive::default()
        };
        let inputs = TickInputs {
            injector: 1.0,
            tender_water_kg: 1000.0,
            ..idle_inputs(0.5)
        };
        let mut a = cold_feed.hot_state(10.0, 5000.0, 0.0);
        let mut b = hot_feed.hot_state(10.0, 5000.0, 0.0);
        let out_a = cold_feed.tick(&mut a, &inputs).unwrap().unwrap();
        let out_b = hot_feed.tick(&mut b, &inputs).unwrap().unwrap();
        assert!(out_b.water_temp_c > out_a.water_temp_c);
        assert!(out_b.pressure_bar > out_a.pressure_bar);
    }

    #[test]
    fn typed_accessors() {
        let out = TickOutputs {
            pressure_bar: 10.0,
            water_level_l: 5000.0,
            power_kw: 1500.0,
            coal_burned_kg: 0.4,
            steam_consumed_kg: 2.5,
            ..TickOutputs::default()
        };
        use loco_core::units::{to_bar, to_kg, to_liters};
        assert!((to_bar(out.pressure()) - 10.0).abs() < 1e-9);
        assert!((to_liters(out.water_level()) - 5000.0).abs() < 1e-9);
        assert!((to_kg(out.coal_burned()) - 0.4).abs() < 1e-12);
        assert!((to_kg(out.steam_consumed()) - 2.5).abs() < 1e-12);
    }
}
