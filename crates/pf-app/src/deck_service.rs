//! Deck generation and simulator batches.

use std::path::PathBuf;

use pf_core::Field;
use pf_deck::{BatchReport, RunSpec, SimulatorRunner, binary_log_diameters, write_decks};
use pf_derive::{BorderConditions, DerivedTable};

use crate::config_service::{DeckSettings, SimulatorSettings};
use crate::error::{AppError, AppResult};

/// Expand the configured grid, with the diameter sweep if one is set.
pub fn plan_runs(settings: &DeckSettings) -> AppResult<Vec<RunSpec>> {
    let mut grid = settings.grid.clone();
    if let Some(sweep) = &settings.diameter_sweep {
        grid.vent_diameters_m = binary_log_diameters(sweep.min_m, sweep.max_m, sweep.interval_size)?;
    }
    grid.validate()?;
    if grid.is_empty() {
        return Err(AppError::InvalidInput(
            "Parameter grid expands to zero runs".to_string(),
        ));
    }
    Ok(grid.runs())
}

/// Runs that repeat each table row at its adjusted vent diameter.
///
/// Rows are taken condition by condition, in table order within a condition.
/// Rows without an adjusted diameter or water fraction are skipped.
pub fn rerun_specs(table: &DerivedTable, conditions: &BorderConditions) -> Vec<RunSpec> {
    let mut runs = Vec::new();
    for &velocity in &conditions.velocities_mps {
        for &temperature in &conditions.temperatures_c {
            for row in &table.rows {
                let r = &row.record;
                if r.get(Field::InitialVelocity) != Some(velocity)
                    || r.get(Field::MagmaTemperature) != Some(temperature)
                {
                    continue;
                }
                let (Some(water), Some(diameter)) =
                    (r.get(Field::ExternalWater), row.adjusted_vent_diameter)
                else {
                    continue;
                };
                runs.push(RunSpec {
                    name: format!("run{}", runs.len() + 1),
                    vent_diameter_m: diameter,
                    water_fraction: water,
                    magma_temperature_c: temperature,
                    vent_velocity_mps: velocity,
                    humidity_pct: r.get(Field::Humidity).unwrap_or(0.0),
                });
            }
        }
    }
    runs
}

/// Write decks for `runs` into the configured directories.
pub fn generate_decks(settings: &DeckSettings, runs: &[RunSpec]) -> AppResult<Vec<PathBuf>> {
    Ok(write_decks(
        runs,
        &settings.vent,
        &settings.input_dir,
        &settings.output_dir,
    )?)
}

pub fn runner(settings: &SimulatorSettings) -> AppResult<SimulatorRunner> {
    let executable = settings.executable.clone().ok_or_else(|| {
        AppError::InvalidInput("No simulator executable configured".to_string())
    })?;
    Ok(SimulatorRunner::new(executable).with_timeout(settings.timeout()?))
}

/// Run the simulator over every deck. Per-run failures land in the report.
pub fn simulate(settings: &SimulatorSettings, decks: &[PathBuf]) -> AppResult<BatchReport> {
    Ok(runner(settings)?.run_batch(decks))
}
