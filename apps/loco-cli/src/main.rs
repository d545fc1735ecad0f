mod compile;
mod error;

use clap::{Parser, Subcommand};
use compile::{compile_locomotive, compile_scenario, find_scenario};
use error::{CliError, CliResult};
use loco_sim::{SimRecord, run_scenario};
use loco_steam::SaturationPoint;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loco-cli")]
#[command(about = "Steam locomotive boiler and cylinder simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and values
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Run a scenario and export the recorded outputs as CSV
    Run {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Scenario ID (optional when the project has only one)
        scenario_id: Option<String>,
        /// Override the scenario end time in seconds
        #[arg(long)]
        t_end: Option<f64>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the saturated steam table
    Saturation {
        /// Highest gauge pressure in bar
        #[arg(long, default_value_t = 20.0)]
        max_bar: f64,
        /// Pressure step in bar
        #[arg(long, default_value_t = 1.0)]
        step_bar: f64,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Run {
            project_path,
            scenario_id,
            t_end,
            output,
        } => cmd_run(
            &project_path,
            scenario_id.as_deref(),
            t_end,
            output.as_deref(),
        ),
        Commands::Saturation { max_bar, step_bar } => cmd_saturation(max_bar, step_bar),
    }
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = loco_project::load(project_path)?;
    compile_locomotive(&project.locomotive)?;
    println!("✓ Project is valid");
    println!("  {} scenario(s)", project.scenarios.len());
    for scenario in &project.scenarios {
        println!("  {} - {}", scenario.id, scenario.name);
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    scenario_id: Option<&str>,
    t_end: Option<f64>,
    output: Option<&Path>,
) -> CliResult<()> {
    let project = loco_project::load(project_path)?;
    let scenario = find_scenario(&project, scenario_id)?;
    let loco = compile_locomotive(&project.locomotive)?;
    let mut compiled = compile_scenario(&loco, scenario)?;
    if let Some(t_end) = t_end {
        compiled.options.t_end = t_end;
    }

    info!(
        scenario = %scenario.id,
        dt = compiled.options.dt,
        t_end = compiled.options.t_end,
        "running scenario"
    );
    let record = run_scenario(
        &loco,
        &mut compiled.state,
        &mut compiled.tender,
        &mut compiled.gear,
        &compiled.schedule,
        &compiled.options,
    )?;

    let csv = record_to_csv(&record);
    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!("✓ Exported {} samples to {}", record.len(), path.display());
        if let Some(last) = record.last() {
            println!(
                "  Final: {:.2} bar, {:.0} L water, {:.0} kW",
                last.pressure_bar, last.water_level_l, last.power_kw
            );
        }
        println!(
            "  Tender: {:.0} kg coal, {:.0} kg water",
            compiled.tender.coal_kg, compiled.tender.water_kg
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}

const CSV_HEADER: &str = "time_s,pressure_bar,water_level_l,water_temp_c,firebox_temp_c,\
power_kw,heat_yield_kw,steam_consumption_kg_s,evaporation_rate_kg_s,oxygen_availability,\
coal_in_firebox_kg,safety_valve_opening,cutoff,fire_lit\n";

fn record_to_csv(record: &SimRecord) -> String {
    let mut csv = String::from(CSV_HEADER);
    for (t, o) in record.t.iter().zip(&record.outputs) {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            t,
            o.pressure_bar,
            o.water_level_l,
            o.water_temp_c,
            o.firebox_temp_c,
            o.power_kw,
            o.heat_yield_kw,
            o.steam_consumption_kg_s,
            o.evaporation_rate_kg_s,
            o.oxygen_availability,
            o.coal_in_firebox_kg,
            o.safety_valve_opening,
            o.cutoff,
            u8::from(o.fire_lit),
        ));
    }
    csv
}

const MAX_TABLE_ROWS: usize = 10_000;

/// Gauge pressures for the saturation table, from 0 to `max_bar` in
/// `step_bar` increments.
fn saturation_pressures(max_bar: f64, step_bar: f64) -> CliResult<Vec<f64>> {
    if !(step_bar.is_finite() && step_bar > 0.0) {
        return Err(CliError::InvalidInput(
            "step must be positive".to_string(),
        ));
    }
    if !(max_bar.is_finite() && max_bar >= 0.0) {
        return Err(CliError::InvalidInput(
            "max pressure must be non-negative".to_string(),
        ));
    }
    let steps = (max_bar / step_bar).floor();
    if steps >= MAX_TABLE_ROWS as f64 {
        return Err(CliError::InvalidInput(format!(
            "step {step_bar} bar gives more than {MAX_TABLE_ROWS} rows"
        )));
    }
    Ok((0..=steps as usize).map(|i| i as f64 * step_bar).collect())
}

fn cmd_saturation(max_bar: f64, step_bar: f64) -> CliResult<()> {
    let pressures = saturation_pressures(max_bar, step_bar)?;

    println!(
        "{:>8} {:>10} {:>12} {:>12} {:>12} {:>10}",
        "p [bar]", "Tb [°C]", "ρw [kg/m³]", "ρs [kg/m³]", "L [kJ/kg]", "cw"
    );
    for p in pressures {
        let sat = SaturationPoint::at(p);
        println!(
            "{:>8.2} {:>10.2} {:>12.2} {:>12.4} {:>12.1} {:>10.3}",
            sat.pressure_bar,
            sat.boiling_point_c,
            sat.water_density_kg_m3,
            sat.steam_density_kg_m3,
            sat.latent_heat_kj_kg,
            sat.water_specific_heat,
        );
    }
    Ok(())
}
