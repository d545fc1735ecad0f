//! Project validation logic.

use crate::schema::{ControlStepDef, InitialMode, LocomotiveDef, Project, ScenarioDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_locomotive(&project.locomotive)?;

    let mut scenario_ids = HashSet::new();
    for scenario in &project.scenarios {
        if !scenario_ids.insert(&scenario.id) {
            return Err(ValidationError::DuplicateId {
                id: scenario.id.clone(),
                context: "scenarios".to_string(),
            });
        }
        validate_scenario(scenario, &project.locomotive)?;
    }

    Ok(())
}

fn validate_locomotive(loco: &LocomotiveDef) -> Result<(), ValidationError> {
    let boiler = &loco.boiler;
    positive("boiler.capacity_l", boiler.capacity_l)?;
    finite("boiler.feedwater_temp_c", boiler.feedwater_temp_c)?;
    if boiler.max_solver_iterations == 0 {
        return Err(invalid(
            "boiler.max_solver_iterations",
            0,
            "must be at least 1",
        ));
    }

    let firebox = &loco.firebox;
    positive("firebox.capacity_kg", firebox.capacity_kg)?;
    fraction("firebox.thermal_efficiency", firebox.thermal_efficiency)?;
    non_negative("firebox.passive_draft_kg_s", firebox.passive_draft_kg_s)?;
    non_negative("firebox.draft_ratio", firebox.draft_ratio)?;
    non_negative("firebox.heat_smoothing_s", firebox.heat_smoothing_s)?;
    positive(
        "firebox.coal_consumption_multiplier",
        firebox.coal_consumption_multiplier,
    )?;
    non_negative("firebox.dump_rate_kg_s", firebox.dump_rate_kg_s)?;

    let cylinders = &loco.cylinders;
    if cylinders.count == 0 {
        return Err(invalid("cylinders.count", 0, "must be at least 1"));
    }
    positive("cylinders.volume_l", cylinders.volume_l)?;
    positive("cylinders.rated_power_kw", cylinders.rated_power_kw)?;
    fraction("cylinders.min_cutoff", cylinders.min_cutoff)?;
    fraction("cylinders.max_cutoff", cylinders.max_cutoff)?;
    if cylinders.min_cutoff > cylinders.max_cutoff {
        return Err(invalid(
            "cylinders.min_cutoff",
            cylinders.min_cutoff,
            "must not exceed max_cutoff",
        ));
    }
    non_negative("cylinders.power_smoothing_s", cylinders.power_smoothing_s)?;

    non_negative("injector.max_rate_kg_s", loco.injector.max_rate_kg_s)?;
    non_negative("injector.feedwater_temp_c", loco.injector.feedwater_temp_c)?;
    positive(
        "injector.consumption_multiplier",
        loco.injector.consumption_multiplier,
    )?;

    let valve = &loco.safety_valve;
    positive("safety_valve.threshold_bar", valve.threshold_bar)?;
    non_negative("safety_valve.blowdown_bar", valve.blowdown_bar)?;
    if valve.blowdown_bar >= valve.threshold_bar {
        return Err(invalid(
            "safety_valve.blowdown_bar",
            valve.blowdown_bar,
            "must be below threshold_bar",
        ));
    }
    non_negative("safety_valve.vent_rate_kg_s", valve.vent_rate_kg_s)?;

    non_negative(
        "stoker_max_firing_rate_kg_s",
        loco.stoker_max_firing_rate_kg_s,
    )?;
    non_negative("blower_max_rate_kg_s", loco.blower_max_rate_kg_s)?;
    non_negative("base_leak_bar_s", loco.base_leak_bar_s)?;
    non_negative("water_dump_rate_kg_s", loco.water_dump_rate_kg_s)?;
    non_negative("steam_release_rate_kg_s", loco.steam_release_rate_kg_s)?;
    Ok(())
}

fn validate_scenario(scenario: &ScenarioDef, loco: &LocomotiveDef) -> Result<(), ValidationError> {
    let ctx = |field: &str| format!("scenario '{}' {}", scenario.id, field);

    let initial = &scenario.initial;
    if initial.mode == InitialMode::Hot {
        non_negative(&ctx("initial.pressure_bar"), initial.pressure_bar)?;
    }
    non_negative(&ctx("initial.water_l"), initial.water_l)?;
    if initial.water_l > loco.boiler.capacity_l {
        return Err(invalid(
            &ctx("initial.water_l"),
            initial.water_l,
            "exceeds boiler capacity",
        ));
    }
    non_negative(&ctx("initial.coal_kg"), initial.coal_kg)?;
    if initial.coal_kg > loco.firebox.capacity_kg {
        return Err(invalid(
            &ctx("initial.coal_kg"),
            initial.coal_kg,
            "exceeds firebox capacity",
        ));
    }

    non_negative(&ctx("tender.coal_kg"), scenario.tender.coal_kg)?;
    non_negative(&ctx("tender.water_kg"), scenario.tender.water_kg)?;
    positive(
        &ctx("driver_circumference_m"),
        scenario.driver_circumference_m,
    )?;
    positive(&ctx("dt_s"), scenario.dt_s)?;
    non_negative(&ctx("t_end_s"), scenario.t_end_s)?;
    if scenario.record_every == 0 {
        return Err(invalid(&ctx("record_every"), 0, "must be at least 1"));
    }

    for (i, step) in scenario.controls.iter().enumerate() {
        validate_control_step(step, &ctx(&format!("controls[{i}]")))?;
    }
    Ok(())
}

fn validate_control_step(step: &ControlStepDef, ctx: &str) -> Result<(), ValidationError> {
    non_negative(&format!("{ctx}.t_s"), step.t_s)?;

    let positions = [
        ("regulator", step.regulator),
        ("cutoff", step.cutoff),
        ("damper", step.damper),
        ("injector", step.injector),
        ("blower", step.blower),
        ("stoker", step.stoker),
        ("water_dump", step.water_dump),
        ("steam_release", step.steam_release),
        ("fire_dump", step.fire_dump),
    ];
    for (name, value) in positions {
        if let Some(v) = value {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(&format!("{ctx}.{name}"), v, "must be in [0, 1]"));
            }
        }
    }

    if let Some(v) = step.firing_rate_kg_s {
        non_negative(&format!("{ctx}.firing_rate_kg_s"), v)?;
    }
    if let Some(v) = step.speed_kmh {
        finite(&format!("{ctx}.speed_kmh"), v)?;
    }
    if let Some(v) = step.leak_multiplier {
        non_negative(&format!("{ctx}.leak_multiplier"), v)?;
    }
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(invalid(field, value, "must be finite"));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(invalid(field, value, "must be non-negative"));
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(field, value, "must be positive"));
    }
    Ok(())
}

fn fraction(field: &str, value: f64) -> Result<(), ValidationError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(field, value, "must be in (0, 1]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InitialStateDef, TenderDef};

    fn scenario(id: &str) -> ScenarioDef {
        ScenarioDef {
            id: id.to_string(),
            name: id.to_string(),
            initial: InitialStateDef::default(),
            tender: TenderDef::default(),
            driver_circumference_m: 4.4,
            dt_s: 0.1,
            t_end_s: 10.0,
            record_every: 10,
            controls: vec![],
        }
    }

    fn project(scenarios: Vec<ScenarioDef>) -> Project {
        Project {
            version: 1,
            name: "test".to_string(),
            locomotive: LocomotiveDef::default(),
            scenarios,
        }
    }

    #[test]
    fn default_project_is_valid() {
        validate_project(&project(vec![scenario("a"), scenario("b")])).unwrap();
    }

    #[test]
    fn duplicate_scenario_rejected() {
        let err = validate_project(&project(vec![scenario("a"), scenario("a")])).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { .. }));
    }

    #[test]
    fn future_version_rejected() {
        let mut p = project(vec![]);
        p.version = 99;
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::UnsupportedVersion { version: 99 })
        ));
    }

    #[test]
    fn bad_locomotive_values_rejected() {
        let mut p = project(vec![]);
        p.locomotive.firebox.thermal_efficiency = 1.5;
        assert!(validate_project(&p).is_err());

        let mut p = project(vec![]);
        p.locomotive.cylinders.min_cutoff = 0.95;
        assert!(validate_project(&p).is_err());

        let mut p = project(vec![]);
        p.locomotive.safety_valve.blowdown_bar = 20.0;
        assert!(validate_project(&p).is_err());

        let mut p = project(vec![]);
        p.locomotive.boiler.capacity_l = f64::NAN;
        assert!(validate_project(&p).is_err());

        let mut p = project(vec![]);
        p.locomotive.firebox.coal_consumption_multiplier = 0.0;
        assert!(validate_project(&p).is_err());

        let mut p = project(vec![]);
        p.locomotive.injector.feedwater_temp_c = -10.0;
        assert!(validate_project(&p).is_err());
    }

    #[test]
    fn overfull_boiler_rejected() {
        let mut s = scenario("a");
        s.initial.water_l = 20_000.0;
        let err = validate_project(&project(vec![s])).unwrap_err();
        assert!(err.to_string().contains("exceeds boiler capacity"));
    }

    #[test]
    fn control_positions_must_be_fractions() {
        let mut s = scenario("a");
        s.controls.push(ControlStepDef {
            t_s: 1.0,
            regulator: Some(1.2),
            ..ControlStepDef::default()
        });
        let err = validate_project(&project(vec![s])).unwrap_err();
        assert!(err.to_string().contains("controls[0].regulator"));

        let mut s = scenario("a");
        s.controls.push(ControlStepDef {
            t_s: 1.0,
            fire_dump: Some(-0.5),
            ..ControlStepDef::default()
        });
        let err = validate_project(&project(vec![s])).unwrap_err();
        assert!(err.to_string().contains("controls[0].fire_dump"));
    }

    #[test]
    fn cold_start_ignores_pressure() {
        let mut s = scenario("a");
        s.initial.mode = InitialMode::Cold;
        s.initial.pressure_bar = -1.0;
        validate_project(&project(vec![s])).unwrap();
    }
}
