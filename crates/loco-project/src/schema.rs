//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub locomotive: LocomotiveDef,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDef>,
}

impl Project {
    pub fn scenario(&self, id: &str) -> Option<&ScenarioDef> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocomotiveDef {
    #[serde(default)]
    pub boiler: BoilerDef,
    #[serde(default)]
    pub firebox: FireboxDef,
    #[serde(default)]
    pub cylinders: CylindersDef,
    #[serde(default)]
    pub injector: InjectorDef,
    #[serde(default)]
    pub safety_valve: SafetyValveDef,
    #[serde(default = "default_stoker_rate")]
    pub stoker_max_firing_rate_kg_s: f64,
    #[serde(default = "default_blower_rate")]
    pub blower_max_rate_kg_s: f64,
    #[serde(default = "default_base_leak")]
    pub base_leak_bar_s: f64,
    #[serde(default = "default_water_dump_rate")]
    pub water_dump_rate_kg_s: f64,
    #[serde(default = "default_steam_release_rate")]
    pub steam_release_rate_kg_s: f64,
}

impl Default for LocomotiveDef {
    fn default() -> Self {
        Self {
            boiler: BoilerDef::default(),
            firebox: FireboxDef::default(),
            cylinders: CylindersDef::default(),
            injector: InjectorDef::default(),
            safety_valve: SafetyValveDef::default(),
            stoker_max_firing_rate_kg_s: default_stoker_rate(),
            blower_max_rate_kg_s: default_blower_rate(),
            base_leak_bar_s: default_base_leak(),
            water_dump_rate_kg_s: default_water_dump_rate(),
            steam_release_rate_kg_s: default_steam_release_rate(),
        }
    }
}

fn default_stoker_rate() -> f64 {
    2.0
}

fn default_blower_rate() -> f64 {
    1.0
}

fn default_base_leak() -> f64 {
    0.003
}

fn default_water_dump_rate() -> f64 {
    13.3
}

fn default_steam_release_rate() -> f64 {
    5.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoilerDef {
    #[serde(default = "default_boiler_capacity")]
    pub capacity_l: f64,
    #[serde(default = "default_feedwater_temp")]
    pub feedwater_temp_c: f64,
    #[serde(default = "default_solver_iterations")]
    pub max_solver_iterations: usize,
}

impl Default for BoilerDef {
    fn default() -> Self {
        Self {
            capacity_l: default_boiler_capacity(),
            feedwater_temp_c: default_feedwater_temp(),
            max_solver_iterations: default_solver_iterations(),
        }
    }
}

fn default_boiler_capacity() -> f64 {
    10_000.0
}

fn default_feedwater_temp() -> f64 {
    15.0
}

fn default_solver_iterations() -> usize {
    40
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FireboxDef {
    #[serde(default = "default_grate_capacity")]
    pub capacity_kg: f64,
    #[serde(default = "default_thermal_efficiency")]
    pub thermal_efficiency: f64,
    #[serde(default = "default_passive_draft")]
    pub passive_draft_kg_s: f64,
    #[serde(default = "default_draft_ratio")]
    pub draft_ratio: f64,
    #[serde(default = "default_heat_smoothing")]
    pub heat_smoothing_s: f64,
    /// Tender coal used per kg fired
    #[serde(default = "default_consumption_multiplier")]
    pub coal_consumption_multiplier: f64,
    #[serde(default = "default_fire_dump_rate")]
    pub dump_rate_kg_s: f64,
}

impl Default for FireboxDef {
    fn default() -> Self {
        Self {
            capacity_kg: default_grate_capacity(),
            thermal_efficiency: default_thermal_efficiency(),
            passive_draft_kg_s: default_passive_draft(),
            draft_ratio: default_draft_ratio(),
            heat_smoothing_s: default_heat_smoothing(),
            coal_consumption_multiplier: default_consumption_multiplier(),
            dump_rate_kg_s: default_fire_dump_rate(),
        }
    }
}

fn default_grate_capacity() -> f64 {
    400.0
}

fn default_thermal_efficiency() -> f64 {
    0.75
}

fn default_passive_draft() -> f64 {
    0.6
}

fn default_draft_ratio() -> f64 {
    1.85
}

fn default_heat_smoothing() -> f64 {
    10.0
}

fn default_consumption_multiplier() -> f64 {
    1.0
}

fn default_fire_dump_rate() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CylindersDef {
    #[serde(default = "default_cylinder_count")]
    pub count: usize,
    #[serde(default = "default_cylinder_volume")]
    pub volume_l: f64,
    #[serde(default = "default_rated_power")]
    pub rated_power_kw: f64,
    #[serde(default = "default_min_cutoff")]
    pub min_cutoff: f64,
    #[serde(default = "default_max_cutoff")]
    pub max_cutoff: f64,
    #[serde(default = "default_power_smoothing")]
    pub power_smoothing_s: f64,
}

impl Default for CylindersDef {
    fn default() -> Self {
        Self {
            count: default_cylinder_count(),
            volume_l: default_cylinder_volume(),
            rated_power_kw: default_rated_power(),
            min_cutoff: default_min_cutoff(),
            max_cutoff: default_max_cutoff(),
            power_smoothing_s: default_power_smoothing(),
        }
    }
}

fn default_cylinder_count() -> usize {
    2
}

fn default_cylinder_volume() -> f64 {
    282.0
}

fn default_rated_power() -> f64 {
    2000.0
}

fn default_min_cutoff() -> f64 {
    0.06
}

fn default_max_cutoff() -> f64 {
    0.9
}

fn default_power_smoothing() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjectorDef {
    #[serde(default = "default_injector_rate")]
    pub max_rate_kg_s: f64,
    /// Temperature of the injected water
    #[serde(default = "default_feedwater_temp")]
    pub feedwater_temp_c: f64,
    /// Tender water used per kg injected
    #[serde(default = "default_consumption_multiplier")]
    pub consumption_multiplier: f64,
}

impl Default for InjectorDef {
    fn default() -> Self {
        Self {
            max_rate_kg_s: default_injector_rate(),
            feedwater_temp_c: default_feedwater_temp(),
            consumption_multiplier: default_consumption_multiplier(),
        }
    }
}

fn default_injector_rate() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyValveDef {
    #[serde(default = "default_valve_threshold")]
    pub threshold_bar: f64,
    #[serde(default = "default_valve_blowdown")]
    pub blowdown_bar: f64,
    #[serde(default = "default_valve_vent_rate")]
    pub vent_rate_kg_s: f64,
}

impl Default for SafetyValveDef {
    fn default() -> Self {
        Self {
            threshold_bar: default_valve_threshold(),
            blowdown_bar: default_valve_blowdown(),
            vent_rate_kg_s: default_valve_vent_rate(),
        }
    }
}

fn default_valve_threshold() -> f64 {
    14.0
}

fn default_valve_blowdown() -> f64 {
    0.35
}

fn default_valve_vent_rate() -> f64 {
    12.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub initial: InitialStateDef,
    #[serde(default)]
    pub tender: TenderDef,
    #[serde(default = "default_driver_circumference")]
    pub driver_circumference_m: f64,
    #[serde(default = "default_dt")]
    pub dt_s: f64,
    pub t_end_s: f64,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default)]
    pub controls: Vec<ControlStepDef>,
}

fn default_driver_circumference() -> f64 {
    4.4
}

fn default_dt() -> f64 {
    0.1
}

fn default_record_every() -> usize {
    10
}

/// Starting condition of the engine.
///
/// ```yaml
/// initial:
///   mode: hot        # or cold
///   pressure_bar: 10.0
///   water_l: 5000.0
///   coal_kg: 100.0
///   fire_lit: true   # defaults to lit for a hot start with coal
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitialStateDef {
    #[serde(default)]
    pub mode: InitialMode,
    /// Ignored for a cold start.
    #[serde(default = "default_initial_pressure")]
    pub pressure_bar: f64,
    #[serde(default = "default_initial_water")]
    pub water_l: f64,
    #[serde(default)]
    pub coal_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_lit: Option<bool>,
}

impl InitialStateDef {
    pub fn fire_lit(&self) -> bool {
        self.fire_lit
            .unwrap_or(self.mode == InitialMode::Hot && self.coal_kg > 0.0)
    }
}

impl Default for InitialStateDef {
    fn default() -> Self {
        Self {
            mode: InitialMode::default(),
            pressure_bar: default_initial_pressure(),
            water_l: default_initial_water(),
            coal_kg: 0.0,
            fire_lit: None,
        }
    }
}

fn default_initial_pressure() -> f64 {
    10.0
}

fn default_initial_water() -> f64 {
    5000.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InitialMode {
    #[default]
    Hot,
    Cold,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TenderDef {
    #[serde(default)]
    pub coal_kg: f64,
    #[serde(default)]
    pub water_kg: f64,
}

/// Control changes at time `t_s`; omitted fields keep their last value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ControlStepDef {
    pub t_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulator: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injector: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoker: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firing_rate_kg_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leak_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_dump: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_release: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_dump: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let yaml = "version: 1\nname: Minimal\n";
        let project: Project = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(project.locomotive, LocomotiveDef::default());
        assert!(project.scenarios.is_empty());
        assert_eq!(project.locomotive.boiler.capacity_l, 10_000.0);
        assert_eq!(project.locomotive.cylinders.count, 2);
    }

    #[test]
    fn initial_mode_is_lowercase() {
        let yaml = "mode: cold\nwater_l: 4000.0\n";
        let initial: InitialStateDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(initial.mode, InitialMode::Cold);
        assert_eq!(initial.water_l, 4000.0);
        assert_eq!(initial.pressure_bar, 10.0);
        assert!(!initial.fire_lit());
    }

    #[test]
    fn control_step_omits_unset_fields() {
        let step = ControlStepDef {
            t_s: 5.0,
            regulator: Some(0.5),
            ..ControlStepDef::default()
        };
        let json = serde_json::to_string(&step).unwrap();
        assert_eq!(json, r#"{"t_s":5.0,"regulator":0.5}"#);
    }

    #[test]
    fn dump_controls_parse() {
        let yaml = "t_s: 30.0\nfire_dump: 1.0\nwater_dump: 0.5\nsteam_release: 0.25\n";
        let step: ControlStepDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(step.fire_dump, Some(1.0));
        assert_eq!(step.water_dump, Some(0.5));
        assert_eq!(step.steam_release, Some(0.25));
        assert_eq!(step.regulator, None);
    }
}
