//! Firebox combustion model.
//!
//! The fire bed is treated as a single mass of coal whose burning surface
//! scales with its mass. Combustion is limited by the oxygen drawn through the
//! grate, which comes from natural stack draft plus the draft induced by steam
//! exhausted up the chimney.

use crate::common::{check_fraction, check_non_negative, check_positive};
use crate::error::ComponentResult;
use loco_core::units::{Power, kw};
use loco_core::{CriticallyDamped, clamp01, inverse_lerp, lerp};

const CARBON_ATOMIC_WEIGHT: f64 = 12.011;
const OXYGEN_ATOMIC_WEIGHT: f64 = 15.999;
/// Oxygen needed beyond stoichiometric to burn completely.
const EXCESS_OXYGEN_FACTOR: f64 = 1.75;
/// kg of oxygen consumed per kg of carbon burned.
pub const OXYGEN_MASS_FACTOR: f64 =
    2.0 * OXYGEN_ATOMIC_WEIGHT / CARBON_ATOMIC_WEIGHT * EXCESS_OXYGEN_FACTOR;

/// Mass fraction of oxygen in air.
pub const ATMOSPHERIC_OXYGEN_FRACTION: f64 = 0.23;

const COAL_DENSITY_KG_M3: f64 = 1346.0;
const COAL_PIECE_RADIUS_M: f64 = 0.02;

/// Burning surface per kg of coal (m²/kg) for uniform spheres.
pub const SURFACE_AREA_PER_KG: f64 = 3.0 / (COAL_DENSITY_KG_M3 * COAL_PIECE_RADIUS_M);

const TEMPERATURE_GAUGE_MAX_C: f64 = 1200.0;
const TEMPERATURE_GAUGE_MAX_POWER_KW: f64 = 20.0e3;
const TEMPERATURE_GAUGE_GAMMA: f64 = 0.4;

/// Firebox parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Firebox {
    /// Maximum coal held on the grate (kg)
    pub capacity_kg: f64,
    /// Burn rate per unit of coal surface with unlimited oxygen (kg/(s·m²))
    pub burn_rate_per_area: f64,
    /// Airflow through the stack by natural convection (kg/s)
    pub passive_draft_kg_s: f64,
    /// Mass of air entrained per kg of exhausted steam
    pub draft_ratio: f64,
    /// Carbon mass fraction of the coal
    pub carbon_fraction: f64,
    /// Heat released per kg of coal (kJ/kg)
    pub specific_energy_kj_kg: f64,
    /// Share of released heat that reaches the water
    pub thermal_efficiency: f64,
    /// Smoothing time of the heat yield (s)
    pub heat_smoothing_s: f64,
    /// Smoothing time of the displayed oxygen availability (s)
    pub oxygen_display_smoothing_s: f64,
    /// Firebox temperature above which fresh coal relights the fire (°C)
    pub ignition_temp_c: f64,
    /// Tender coal used per kg put on the grate
    pub coal_consumption_multiplier: f64,
    /// Rate the grate empties with the fire dump fully open (kg/s)
    pub dump_rate_kg_s: f64,
}

impl Default for Firebox {
    fn default() -> Self {
        Self {
            capacity_kg: 400.0,
            burn_rate_per_area: 0.013,
            passive_draft_kg_s: 0.6,
            draft_ratio: 1.85,
            carbon_fraction: 0.6,
            specific_energy_kj_kg: 32.81e3,
            thermal_efficiency: 0.75,
            heat_smoothing_s: 10.0,
            oxygen_display_smoothing_s: 1.0,
            ignition_temp_c: 400.0,
            coal_consumption_multiplier: 1.0,
            dump_rate_kg_s: 10.0,
        }
    }
}

/// Coal moved from the tender to the grate in one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuelTransfer {
    /// Mass landing on the grate (kg)
    pub into_firebox_kg: f64,
    /// Mass leaving the tender (kg)
    pub from_tender_kg: f64,
}

/// Mutable state of one fire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FireState {
    pub coal_kg: f64,
    pub lit: bool,
    /// Oxygen reaching the grate (kg/s)
    pub oxygen_supply_kg_s: f64,
    /// Oxygen supply as a fraction of demand, in [0, 1]
    pub oxygen_availability: f64,
    pub smoothed_oxygen: CriticallyDamped,
    pub heat_yield: CriticallyDamped,
}

impl FireState {
    /// A fire with `coal_kg` on the grate.
    pub fn new(coal_kg: f64, lit: bool) -> Self {
        Self {
            coal_kg: coal_kg.max(0.0),
            lit,
            ..Self::default()
        }
    }

    /// Smoothed heat yield (kW) as last computed.
    pub fn heat_yield_kw(&self) -> f64 {
        self.heat_yield.value
    }

    pub fn heat_yield(&self) -> Power {
        kw(self.heat_yield.value)
    }
}

impl Firebox {
    /// Create a firebox with the given capacity and thermal efficiency.
    pub fn new(capacity_kg: f64, thermal_efficiency: f64) -> ComponentResult<Self> {
        let firebox = Self {
            capacity_kg,
            thermal_efficiency,
            ..Self::default()
        };
        firebox.validate()?;
        Ok(firebox)
    }

    pub fn with_heat_smoothing(mut self, seconds: f64) -> Self {
        self.heat_smoothing_s = seconds;
        self
    }

    pub fn with_coal_consumption_multiplier(mut self, multiplier: f64) -> Self {
        self.coal_consumption_multiplier = multiplier;
        self
    }

    pub fn with_draft(mut self, passive_kg_s: f64, draft_ratio: f64) -> Self {
        self.passive_draft_kg_s = passive_kg_s;
        self.draft_ratio = draft_ratio;
        self
    }

    /// Check every parameter.
    pub fn validate(&self) -> ComponentResult<()> {
        check_positive(self.capacity_kg, "firebox capacity")?;
        check_positive(self.burn_rate_per_area, "burn rate per area")?;
        check_non_negative(self.passive_draft_kg_s, "passive draft")?;
        check_non_negative(self.draft_ratio, "draft ratio")?;
        check_fraction(self.carbon_fraction, "carbon fraction")?;
        check_positive(self.specific_energy_kj_kg, "coal specific energy")?;
        check_fraction(self.thermal_efficiency, "thermal efficiency")?;
        check_non_negative(self.heat_smoothing_s, "heat smoothing time")?;
        check_non_negative(self.oxygen_display_smoothing_s, "oxygen smoothing time")?;
        check_non_negative(self.ignition_temp_c, "ignition temperature")?;
        check_positive(self.coal_consumption_multiplier, "coal consumption multiplier")?;
        check_non_negative(self.dump_rate_kg_s, "fire dump rate")?;
        Ok(())
    }

    /// Burning coal surface (m²).
    pub fn total_surface_area(&self, coal_kg: f64) -> f64 {
        coal_kg.max(0.0) * SURFACE_AREA_PER_KG
    }

    /// Coal consumption (kg/s) with unlimited oxygen.
    pub fn max_coal_consumption_rate(&self, coal_kg: f64) -> f64 {
        self.burn_rate_per_area * self.total_surface_area(coal_kg)
    }

    /// Oxygen demand (kg/s) at the unlimited burn rate.
    pub fn max_oxygen_consumption_rate(&self, coal_kg: f64) -> f64 {
        self.max_coal_consumption_rate(coal_kg) * OXYGEN_MASS_FACTOR * self.carbon_fraction
    }

    /// Update the oxygen supply from the exhaust flow (kg/s) and damper
    /// opening. Returns the supply in kg/s.
    pub fn set_oxygen_supply(
        &self,
        state: &mut FireState,
        exhaust_kg_s: f64,
        damper: f64,
        dt: f64,
    ) -> f64 {
        let air = self.passive_draft_kg_s + exhaust_kg_s.max(0.0) * self.draft_ratio;
        let supply = air * ATMOSPHERIC_OXYGEN_FRACTION * clamp01(damper);
        let demand = self.max_oxygen_consumption_rate(state.coal_kg);

        state.oxygen_supply_kg_s = supply;
        state.oxygen_availability = if demand > 0.0 {
            clamp01(supply / demand)
        } else if supply > 0.0 {
            1.0
        } else {
            0.0
        };
        state.smoothed_oxygen.update(
            state.oxygen_availability,
            self.oxygen_display_smoothing_s,
            dt,
        );
        supply
    }

    /// Multiplier on the burn rate from oxygen starvation.
    pub fn combustion_multiplier(&self, state: &FireState) -> f64 {
        (2.0 * state.oxygen_availability).min(1.0)
    }

    /// Current coal consumption (kg/s).
    pub fn coal_consumption_rate(&self, state: &FireState) -> f64 {
        self.combustion_multiplier(state) * self.max_coal_consumption_rate(state.coal_kg)
    }

    /// Heat reaching the water (kW) before smoothing; zero when unlit.
    pub fn instantaneous_heat_yield_rate(&self, state: &FireState) -> f64 {
        if !state.lit {
            return 0.0;
        }
        self.coal_consumption_rate(state)
            * self.specific_energy_kj_kg
            * self.carbon_fraction
            * combustion_efficiency(state.oxygen_availability)
            * self.thermal_efficiency
    }

    /// Advance the smoothed heat yield and return it (kW).
    pub fn smoothed_heat_yield_rate(&self, state: &mut FireState, dt: f64) -> f64 {
        let target = self.instantaneous_heat_yield_rate(state);
        state.heat_yield.update(target, self.heat_smoothing_s, dt).max(0.0)
    }

    /// Burn coal for `dt` seconds; returns the mass burned (kg).
    ///
    /// The fire goes out once the grate is empty.
    pub fn burn(&self, state: &mut FireState, dt: f64) -> f64 {
        if !state.lit || dt <= 0.0 {
            return 0.0;
        }
        if state.coal_kg <= 0.0 {
            state.coal_kg = 0.0;
            state.lit = false;
            return 0.0;
        }
        let burned = (self.coal_consumption_rate(state) * dt).min(state.coal_kg);
        state.coal_kg -= burned;
        if state.coal_kg <= 0.0 {
            state.coal_kg = 0.0;
            state.lit = false;
        }
        burned
    }

    /// Put up to `kg` of coal on the grate; returns the mass accepted.
    ///
    /// A dead fire relights if the firebox is still above ignition temperature.
    pub fn add_fuel(&self, state: &mut FireState, kg: f64, firebox_temp_c: f64) -> f64 {
        let room = (self.capacity_kg - state.coal_kg).max(0.0);
        let accepted = kg.max(0.0).min(room);
        state.coal_kg += accepted;
        if accepted > 0.0 && !state.lit && firebox_temp_c > self.ignition_temp_c {
            state.lit = true;
        }
        accepted
    }

    /// Fire `requested_kg` from a tender holding `tender_coal_kg`.
    ///
    /// The tender is charged the consumption multiplier times what lands on
    /// the grate, and never more than it holds.
    pub fn add_fuel_from_tender(
        &self,
        state: &mut FireState,
        requested_kg: f64,
        tender_coal_kg: f64,
        firebox_temp_c: f64,
    ) -> FuelTransfer {
        let multiplier = self.coal_consumption_multiplier;
        let taken = (requested_kg.max(0.0) * multiplier).min(tender_coal_kg.max(0.0));
        let accepted = self.add_fuel(state, taken / multiplier, firebox_temp_c);
        FuelTransfer {
            into_firebox_kg: accepted,
            from_tender_kg: accepted * multiplier,
        }
    }

    /// Drop coal through the grate for `dt` with the dump open to `setting`;
    /// returns the mass dumped (kg). An emptied grate puts the fire out.
    pub fn dump(&self, state: &mut FireState, setting: f64, dt: f64) -> f64 {
        if dt <= 0.0 || state.coal_kg <= 0.0 {
            return 0.0;
        }
        let dumped = (self.dump_rate_kg_s * clamp01(setting) * dt).min(state.coal_kg);
        state.coal_kg -= dumped;
        if state.coal_kg <= 0.0 {
            state.coal_kg = 0.0;
            state.lit = false;
        }
        dumped
    }
}

/// Fraction of the coal's chemical energy released at a given oxygen
/// availability.
///
/// Starved fires burn to CO; above half availability the CO₂ share grows
/// until full combustion at availability 1.
pub fn combustion_efficiency(oxygen_availability: f64) -> f64 {
    let a = clamp01(oxygen_availability);
    let (co, co2) = if a < 0.5 {
        (a / 2.0, 0.0)
    } else {
        (0.25, 1.5 * a - 0.75)
    };
    co + co2
}

/// Firebox gauge temperature (°C) for a heat yield (kW).
pub fn firebox_temperature(boiling_point_c: f64, heat_kw: f64) -> f64 {
    let t = inverse_lerp(0.0, TEMPERATURE_GAUGE_MAX_POWER_KW, heat_kw);
    lerp(
        boiling_point_c,
        TEMPERATURE_GAUGE_MAX_C,
        t.powf(TEMPERATURE_GAUGE_GAMMA),
    )
}
