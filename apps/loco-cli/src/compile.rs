//! Turn project definitions into simulation objects.

use crate::error::{CliError, CliResult};
use loco_components::{Blower, Cylinders, FireState, Firebox, Injector, SafetyValve, Stoker};
use loco_project::{ControlStepDef, InitialMode, LocomotiveDef, ScenarioDef};
use loco_sim::{
    Boiler, ControlSchedule, ControlStep, EquilibriumSolver, LocoState, Locomotive, RunningGear,
    SimOptions, Tender,
};

/// Everything `run_scenario` needs for one scenario.
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub state: LocoState,
    pub tender: Tender,
    pub gear: RunningGear,
    pub schedule: ControlSchedule,
    pub options: SimOptions,
}

pub fn compile_locomotive(def: &LocomotiveDef) -> CliResult<Locomotive> {
    let loco = Locomotive {
        boiler: Boiler {
            capacity_l: def.boiler.capacity_l,
            feedwater_temp_c: def.boiler.feedwater_temp_c,
            solver: EquilibriumSolver {
                max_iterations: def.boiler.max_solver_iterations,
                ..EquilibriumSolver::default()
            },
            ..Boiler::default()
        },
        firebox: Firebox {
            capacity_kg: def.firebox.capacity_kg,
            thermal_efficiency: def.firebox.thermal_efficiency,
            passive_draft_kg_s: def.firebox.passive_draft_kg_s,
            draft_ratio: def.firebox.draft_ratio,
            heat_smoothing_s: def.firebox.heat_smoothing_s,
            coal_consumption_multiplier: def.firebox.coal_consumption_multiplier,
            dump_rate_kg_s: def.firebox.dump_rate_kg_s,
            ..Firebox::default()
        },
        cylinders: Cylinders {
            count: def.cylinders.count,
            volume_l: def.cylinders.volume_l,
            rated_power_kw: def.cylinders.rated_power_kw,
            min_cutoff: def.cylinders.min_cutoff,
            max_cutoff: def.cylinders.max_cutoff,
            power_smoothing_s: def.cylinders.power_smoothing_s,
            ..Cylinders::default()
        },
        injector: Injector {
            max_rate_kg_s: def.injector.max_rate_kg_s,
            feedwater_temp_c: def.injector.feedwater_temp_c,
            consumption_multiplier: def.injector.consumption_multiplier,
            ..Injector::default()
        },
        safety_valve: SafetyValve {
            threshold_bar: def.safety_valve.threshold_bar,
            blowdown_bar: def.safety_valve.blowdown_bar,
            vent_rate_kg_s: def.safety_valve.vent_rate_kg_s,
            ..SafetyValve::default()
        },
        stoker: Stoker::new(def.stoker_max_firing_rate_kg_s).map_err(loco_sim::SimError::from)?,
        blower: Blower::new(def.blower_max_rate_kg_s).map_err(loco_sim::SimError::from)?,
        base_leak_bar_s: def.base_leak_bar_s,
        water_dump_rate_kg_s: def.water_dump_rate_kg_s,
        steam_release_rate_kg_s: def.steam_release_rate_kg_s,
    };
    loco.validate()?;
    Ok(loco)
}

pub fn compile_scenario(loco: &Locomotive, def: &ScenarioDef) -> CliResult<CompiledScenario> {
    let initial = &def.initial;
    let mut state = match initial.mode {
        InitialMode::Hot => loco.hot_state(initial.pressure_bar, initial.water_l, initial.coal_kg),
        InitialMode::Cold => loco.cold_state(initial.water_l, initial.coal_kg),
    };
    state.fire = FireState::new(initial.coal_kg, initial.fire_lit());

    let steps = def.controls.iter().map(control_step).collect();

    Ok(CompiledScenario {
        state,
        tender: Tender::new(def.tender.coal_kg, def.tender.water_kg)?,
        gear: RunningGear::new(def.driver_circumference_m)?,
        schedule: ControlSchedule::new(steps)?,
        options: SimOptions {
            dt: def.dt_s,
            t_end: def.t_end_s,
            record_every: def.record_every,
            ..SimOptions::default()
        },
    })
}

fn control_step(def: &ControlStepDef) -> ControlStep {
    ControlStep {
        t: def.t_s,
        regulator: def.regulator,
        cutoff: def.cutoff,
        damper: def.damper,
        injector: def.injector,
        blower: def.blower,
        stoker: def.stoker,
        firing_rate_kg_s: def.firing_rate_kg_s,
        speed_kmh: def.speed_kmh,
        leak_multiplier: def.leak_multiplier,
        water_dump: def.water_dump,
        steam_release: def.steam_release,
        fire_dump: def.fire_dump,
    }
}

pub fn find_scenario<'a>(
    project: &'a loco_project::Project,
    id: Option<&str>,
) -> CliResult<&'a ScenarioDef> {
    match id {
        Some(id) => project
            .scenario(id)
            .ok_or_else(|| CliError::ScenarioNotFound(id.to_string())),
        None => match project.scenarios.as_slice() {
            [only] => Ok(only),
            [] => Err(CliError::InvalidInput(
                "project has no scenarios".to_string(),
            )),
            _ => Err(CliError::InvalidInput(
                "project has several scenarios; pass a scenario id".to_string(),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loco_project::{InitialStateDef, Project, TenderDef};

    fn scenario(mode: InitialMode) -> ScenarioDef {
        ScenarioDef {
            id: "s".to_string(),
            name: "s".to_string(),
            initial: InitialStateDef {
                mode,
                coal_kg: 50.0,
                ..InitialStateDef::default()
            },
            tender: TenderDef {
                coal_kg: 100.0,
                water_kg: 200.0,
            },
            driver_circumference_m: 4.4,
            dt_s: 0.2,
            t_end_s: 5.0,
            record_every: 5,
            controls: vec![ControlStepDef {
                t_s: 1.0,
                regulator: Some(0.4),
                fire_dump: Some(0.5),
                ..ControlStepDef::default()
            }],
        }
    }

    #[test]
    fn default_definition_matches_default_locomotive() {
        let loco = compile_locomotive(&LocomotiveDef::default()).unwrap();
        assert_eq!(loco, Locomotive::default());
    }

    #[test]
    fn overrides_reach_components() {
        let mut def = LocomotiveDef::default();
        def.cylinders.count = 3;
        def.safety_valve.threshold_bar = 16.0;
        def.injector.feedwater_temp_c = 70.0;
        def.firebox.coal_consumption_multiplier = 1.5;
        def.steam_release_rate_kg_s = 8.0;
        let loco = compile_locomotive(&def).unwrap();
        assert_eq!(loco.cylinders.count, 3);
        assert_eq!(loco.rated_pressure_bar(), 16.0);
        assert_eq!(loco.injector.feedwater_temp_c, 70.0);
        assert_eq!(loco.firebox.coal_consumption_multiplier, 1.5);
        assert_eq!(loco.steam_release_rate_kg_s, 8.0);
    }

    #[test]
    fn negative_stoker_rate_rejected() {
        let mut def = LocomotiveDef::default();
        def.stoker_max_firing_rate_kg_s = -1.0;
        assert!(compile_locomotive(&def).is_err());
    }

    #[test]
    fn hot_and_cold_starts() {
        let loco = Locomotive::default();
        let hot = compile_scenario(&loco, &scenario(InitialMode::Hot)).unwrap();
        assert_eq!(hot.state.boiler.pressure_bar, 10.0);
        assert!(hot.state.fire.lit);

        let cold = compile_scenario(&loco, &scenario(InitialMode::Cold)).unwrap();
        assert_eq!(cold.state.boiler.pressure_bar, 0.0);
        assert!(!cold.state.fire.lit);
        assert_eq!(cold.options.dt, 0.2);
        assert_eq!(cold.schedule.controls_at(2.0).regulator, 0.4);
        assert_eq!(cold.schedule.controls_at(2.0).fire_dump, 0.5);
        assert_eq!(cold.tender.water_kg, 200.0);
    }

    #[test]
    fn scenario_lookup() {
        let mut project = Project {
            version: 1,
            name: "p".to_string(),
            locomotive: LocomotiveDef::default(),
            scenarios: vec![scenario(InitialMode::Hot)],
        };
        assert_eq!(find_scenario(&project, None).unwrap().id, "s");
        assert!(find_scenario(&project, Some("missing")).is_err());

        let mut other = scenario(InitialMode::Cold);
        other.id = "t".to_string();
        project.scenarios.push(other);
        assert!(find_scenario(&project, None).is_err());
        assert_eq!(find_scenario(&project, Some("t")).unwrap().id, "t");
    }
}
