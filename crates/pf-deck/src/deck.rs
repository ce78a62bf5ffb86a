//! Simulator input decks.
//!
//! The simulator reads one value per line, in a fixed order, ignoring anything
//! after the value and any line starting with `#`. The deck also names the
//! output file the simulator will write.

use crate::grid::RunSpec;
use crate::{DeckError, DeckResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const LAPSE_RATE_TROPOSPHERE_K_PER_M: f64 = -0.0065;
const TROPOPAUSE_ELEVATION_M: f64 = 11000.0;
const TROPOPAUSE_THICKNESS_M: f64 = 9000.0;
const LAPSE_RATE_STRATOSPHERE_K_PER_M: f64 = 0.0016;

/// Vent and magma properties shared by every run of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VentProperties {
    /// Mass fraction gas in magma.
    pub gas_fraction: f64,
    pub specific_heat_j_per_kg_k: f64,
    /// Dense-rock-equivalent magma density.
    pub dre_density_kg_m3: f64,
    pub vent_elevation_m: f64,
    pub air_temperature_c: f64,
    /// Atmospheric sounding read by the simulator instead of the
    /// tropospheric defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sounding_file: Option<PathBuf>,
}

impl Default for VentProperties {
    fn default() -> Self {
        Self {
            gas_fraction: 0.03,
            specific_heat_j_per_kg_k: 1000.0,
            dre_density_kg_m3: 2500.0,
            vent_elevation_m: 0.0,
            air_temperature_c: 0.0,
            sounding_file: None,
        }
    }
}

pub fn deck_file_name(run_name: &str) -> String {
    format!("Grid_Runs_in_{run_name}.txt")
}

pub fn output_file_name(run_name: &str) -> String {
    format!("Grid_Runs_out_{run_name}.txt")
}

/// Values are written with a decimal point so the simulator reads them as
/// reals.
fn real(v: f64) -> String {
    format!("{v:?}")
}

/// One run's input deck.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDeck<'a> {
    pub run: &'a RunSpec,
    pub vent: &'a VentProperties,
    /// Directory the simulator writes its report into.
    pub output_dir: &'a Path,
}

impl<'a> InputDeck<'a> {
    pub fn new(run: &'a RunSpec, vent: &'a VentProperties, output_dir: &'a Path) -> Self {
        Self {
            run,
            vent,
            output_dir,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(output_file_name(&self.run.name))
    }

    /// Deck text, newline separated, no trailing newline.
    pub fn render(&self) -> String {
        let run = self.run;
        let vent = self.vent;
        let mut s = String::new();

        // write! into a String cannot fail
        let mut line = |text: String| {
            let _ = writeln!(s, "{text}");
        };

        line("#  Input file for the Fortran version of Plumeria.".into());
        line("#  Lines that begin with a '#' are comment lines.".into());
        line(String::new());
        line("#  Output file name".into());
        line(self.output_path().display().to_string());
        line(String::new());
        line("#  Information on whether to read met. input file.".into());
        line("#  The first line should supply a yes or no. If that line is yes, the next line".into());
        line("#  should be the name of the input file used.".into());
        match &vent.sounding_file {
            Some(path) => {
                line(format!("{:<34}#are you supplying a file of atmospheric properties?", "yes"));
                line(path.display().to_string());
            }
            None => {
                line(format!("{:<34}#are you supplying a file of atmospheric properties?", "no"));
                line(" #".into());
            }
        }
        line("#  Tropospheric properties (used only if no atmospheric file is used)".into());
        line(String::new());
        line(format!("{:<21}#Air temperature at vent, Celsius.", real(vent.air_temperature_c)));
        line(format!("{:<21}#Air relative humidity", real(run.humidity_pct)));
        line(format!(
            "{:<21}#thermal lapse rate in troposphere (K/m upward--should be negative)",
            real(LAPSE_RATE_TROPOSPHERE_K_PER_M)
        ));
        line(format!("{:<21}#Elevation of tropopause (m asl)", real(TROPOPAUSE_ELEVATION_M)));
        line(format!("{:<21}#Tropopause thickness, m", real(TROPOPAUSE_THICKNESS_M)));
        line(format!(
            "{:<21}#thermal lapse rate above tropopause (K/m--should be positive)",
            real(LAPSE_RATE_STRATOSPHERE_K_PER_M)
        ));
        line(String::new());
        line("#  Vent properties".into());
        line(String::new());
        line(format!("{:<31}#Vent elevation (m asl)", real(vent.vent_elevation_m)));
        line(format!("{:<21}#vent diameter (m)", real(run.vent_diameter_m)));
        line(format!("{:<21}#exit velocity (m/s)", real(run.vent_velocity_mps)));
        line(format!("{:<21}#mass fraction added water", real(run.water_fraction)));
        line(String::new());
        line("#   Magma properties".into());
        line(String::new());
        line(format!("{:<21}#magma temperature", real(run.magma_temperature_c)));
        line(format!("{:<21}#mass fraction gas in magma", real(vent.gas_fraction)));
        line(format!(
            "{:<21}#magma specific heat, J/kg K",
            real(vent.specific_heat_j_per_kg_k)
        ));
        line(format!(
            "{:<21}#magma density (DRE), kg/m3",
            real(vent.dre_density_kg_m3)
        ));

        s.truncate(s.trim_end_matches('\n').len());
        s
    }

    /// Write the deck into `input_dir`, returning its path.
    pub fn write(&self, input_dir: &Path) -> DeckResult<PathBuf> {
        let path = input_dir.join(deck_file_name(&self.run.name));
        std::fs::write(&path, self.render()).map_err(|source| DeckError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Write one deck per run, creating both directories first.
///
/// Deck paths are returned in run order.
pub fn write_decks(
    runs: &[RunSpec],
    vent: &VentProperties,
    input_dir: &Path,
    output_dir: &Path,
) -> DeckResult<Vec<PathBuf>> {
    for dir in [input_dir, output_dir] {
        std::fs::create_dir_all(dir).map_err(|source| DeckError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let paths = runs
        .iter()
        .map(|run| InputDeck::new(run, vent, output_dir).write(input_dir))
        .collect::<DeckResult<Vec<_>>>()?;
    tracing::info!(
        decks = paths.len(),
        input_dir = %input_dir.display(),
        "input decks written"
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> RunSpec {
        RunSpec {
            name: "run7".into(),
            vent_diameter_m: 45.2548,
            water_fraction: 0.12,
            magma_temperature_c: 900.0,
            vent_velocity_mps: 100.0,
            humidity_pct: 0.0,
        }
    }

    #[test]
    fn deck_lines_in_simulator_order() {
        let run = run();
        let vent = VentProperties::default();
        let text = InputDeck::new(&run, &vent, Path::new("out")).render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 33);
        assert_eq!(
            lines[4],
            Path::new("out").join("Grid_Runs_out_run7.txt").display().to_string()
        );
        assert!(lines[9].starts_with("no "));
        assert_eq!(lines[10], " #");
        assert!(lines[13].starts_with("0.0 "));
        assert!(lines[14].starts_with("0.0 "));
        assert!(lines[23].starts_with("45.2548 "));
        assert!(lines[24].starts_with("100.0 "));
        assert!(lines[25].starts_with("0.12 "));
        assert!(lines[29].starts_with("900.0 "));
        assert!(lines[30].starts_with("0.03 "));
        assert!(lines[32].starts_with("2500.0 "));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn sounding_replaces_placeholder() {
        let run = run();
        let vent = VentProperties {
            sounding_file: Some(PathBuf::from("soundings/profile.txt")),
            ..Default::default()
        };
        let text = InputDeck::new(&run, &vent, Path::new("out")).render();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[9].starts_with("yes "));
        assert_eq!(lines[10], "soundings/profile.txt");
        assert_eq!(lines.len(), 33);
    }

    #[test]
    fn every_value_has_a_decimal_point() {
        assert_eq!(real(50.0), "50.0");
        assert_eq!(real(-0.0065), "-0.0065");
        assert_eq!(real(11000.0), "11000.0");
    }
}
