//! Scripted runs at a fixed time step.

use crate::checks::validate_non_negative;
use crate::error::{SimError, SimResult};
use crate::locomotive::{LocoState, Locomotive, TickInputs, TickOutputs};
use loco_core::units::constants::KMH_PER_MPS;
use loco_core::units::{Time, s};
use serde::Serialize;

/// Options for scenario runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            t_end: 60.0,
            max_steps: 1_000_000,
            record_every: 10,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(self.t_end.is_finite() && self.t_end >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "t_end must be non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        Ok(())
    }
}

/// Control settings that take effect at time `t`. Unset fields keep their
/// previous value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlStep {
    pub t: f64,
    pub regulator: Option<f64>,
    pub cutoff: Option<f64>,
    pub damper: Option<f64>,
    pub injector: Option<f64>,
    pub blower: Option<f64>,
    pub stoker: Option<f64>,
    /// Hand firing rate (kg/s)
    pub firing_rate_kg_s: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub leak_multiplier: Option<f64>,
    pub water_dump: Option<f64>,
    pub steam_release: Option<f64>,
    pub fire_dump: Option<f64>,
}

/// Control settings in force at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub regulator: f64,
    pub cutoff: f64,
    pub damper: f64,
    pub injector: f64,
    pub blower: f64,
    pub stoker: f64,
    pub firing_rate_kg_s: f64,
    pub speed_kmh: f64,
    pub leak_multiplier: f64,
    pub water_dump: f64,
    pub steam_release: f64,
    pub fire_dump: f64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            regulator: 0.0,
            cutoff: 0.0,
            damper: 1.0,
            injector: 0.0,
            blower: 0.0,
            stoker: 0.0,
            firing_rate_kg_s: 0.0,
            speed_kmh: 0.0,
            leak_multiplier: 1.0,
            water_dump: 0.0,
            steam_release: 0.0,
            fire_dump: 0.0,
        }
    }
}

impl Controls {
    fn apply(&mut self, step: &ControlStep) {
        let fields = [
            (&mut self.regulator, step.regulator),
            (&mut self.cutoff, step.cutoff),
            (&mut self.damper, step.damper),
            (&mut self.injector, step.injector),
            (&mut self.blower, step.blower),
            (&mut self.stoker, step.stoker),
            (&mut self.firing_rate_kg_s, step.firing_rate_kg_s),
            (&mut self.speed_kmh, step.speed_kmh),
            (&mut self.leak_multiplier, step.leak_multiplier),
            (&mut self.water_dump, step.water_dump),
            (&mut self.steam_release, step.steam_release),
            (&mut self.fire_dump, step.fire_dump),
        ];
        for (slot, value) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

/// Time-ordered control steps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlSchedule {
    steps: Vec<ControlStep>,
}

impl ControlSchedule {
    /// Build a schedule; steps are sorted by time.
    pub fn new(mut steps: Vec<ControlStep>) -> SimResult<Self> {
        if steps.iter().any(|s| !s.t.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "control step time must be finite",
            });
        }
        steps.sort_by(|a, b| a.t.total_cmp(&b.t));
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[ControlStep] {
        &self.steps
    }

    /// Controls in force at time `t`.
    pub fn controls_at(&self, t: f64) -> Controls {
        let mut controls = Controls::default();
        for step in self.steps.iter().take_while(|s| s.t <= t) {
            controls.apply(step);
        }
        controls
    }
}

/// Coal and water carried behind the engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tender {
    pub coal_kg: f64,
    pub water_kg: f64,
}

impl Tender {
    pub fn new(coal_kg: f64, water_kg: f64) -> SimResult<Self> {
        Ok(Self {
            coal_kg: validate_non_negative(coal_kg, "tender coal")?,
            water_kg: validate_non_negative(water_kg, "tender water")?,
        })
    }

    /// Charge the tender for what a tick took.
    pub fn debit(&mut self, out: &TickOutputs) {
        self.coal_kg = (self.coal_kg - out.coal_from_tender_kg).max(0.0);
        self.water_kg = (self.water_kg - out.water_from_tender_kg).max(0.0);
    }
}

/// Driving wheels turning at a commanded road speed.
#[derive(Clone, Debug, PartialEq)]
pub struct RunningGear {
    pub driver_circumference_m: f64,
    /// Wheel position (revolutions), kept in [0, 1)
    pub revolution: f64,
}

impl RunningGear {
    pub fn new(driver_circumference_m: f64) -> SimResult<Self> {
        if !(driver_circumference_m.is_finite() && driver_circumference_m > 0.0) {
            return Err(SimError::InvalidArg {
                what: "driver circumference must be positive",
            });
        }
        Ok(Self {
            driver_circumference_m,
            revolution: 0.0,
        })
    }

    /// Wheel speed (rev/s) at a road speed.
    pub fn rotation_speed(&self, speed_kmh: f64) -> f64 {
        speed_kmh / KMH_PER_MPS / self.driver_circumference_m
    }

    fn advance(&mut self, rotation_speed: f64, dt: f64) {
        self.revolution = (self.revolution + rotation_speed * dt).rem_euclid(1.0);
    }
}

impl Default for RunningGear {
    fn default() -> Self {
        Self {
            driver_circumference_m: 4.4,
            revolution: 0.0,
        }
    }
}

/// Record of a scenario run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SimRecord {
    /// Time points (seconds)
    pub t: Vec<f64>,
    pub outputs: Vec<TickOutputs>,
}

impl SimRecord {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn last(&self) -> Option<&TickOutputs> {
        self.outputs.last()
    }

    /// Simulated time covered by the record.
    pub fn duration(&self) -> Time {
        s(self.t.last().copied().unwrap_or(0.0))
    }
}

/// Drive `state` through `schedule` until `t_end`.
///
/// Every `record_every`-th tick is recorded, plus the final one.
pub fn run_scenario(
    loco: &Locomotive,
    state: &mut LocoState,
    tender: &mut Tender,
    gear: &mut RunningGear,
    schedule: &ControlSchedule,
    opts: &SimOptions,
) -> SimResult<SimRecord> {
    opts.validate()?;
    loco.validate()?;

    let mut record = SimRecord::default();
    let mut t = 0.0;
    let mut step = 0;
    let mut last: Option<TickOutputs> = None;

    while t < opts.t_end && step < opts.max_steps {
        let controls = schedule.controls_at(t);
        let rotation_speed = gear.rotation_speed(controls.speed_kmh);
        let inputs = TickInputs {
            dt: opts.dt,
            regulator: controls.regulator,
            cutoff: controls.cutoff,
            damper: controls.damper,
            injector: controls.injector,
            blower: controls.blower,
            stoker: controls.stoker,
            fuel_feed_kg: controls.firing_rate_kg_s * opts.dt,
            wheel_revolution: gear.revolution,
            rotation_speed,
            tender_coal_kg: tender.coal_kg,
            tender_water_kg: tender.water_kg,
            leak_multiplier: controls.leak_multiplier,
            water_dump: controls.water_dump,
            steam_release: controls.steam_release,
            fire_dump: controls.fire_dump,
        };

        let out = loco.tick(state, &inputs)?.ok_or(SimError::InvalidArg {
            what: "dt must be positive",
        })?;
        tender.debit(&out);
        gear.advance(rotation_speed, opts.dt);
        t += opts.dt;
        step += 1;

        if step % opts.record_every == 0 {
            record.t.push(t);
            record.outputs.push(out.clone());
        }
        last = Some(out);
    }

    // Always record final state
    if step % opts.record_every != 0 {
        if let Some(out) = last {
            record.t.push(t);
            record.outputs.push(out);
        }
    }

    Ok(record)
}
