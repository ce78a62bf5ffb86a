//! Pipeline configuration: loading, saving, validation.
//!
//! Every knob the pipeline reads lives here, so one YAML file fully
//! describes how a directory of reports becomes a table.

use pf_core::Schema;
use pf_deck::{ParameterGrid, VentProperties};
use pf_derive::{BorderConditions, DeriveOptions, RegimeClassifier};
use pf_extract::ParserLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Name of a built-in report layout.
    pub layout: String,
    /// Replaces the named preset when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_layout: Option<ParserLayout>,
    /// Read the first vertical profile row as well.
    pub with_profile: bool,
    pub parallel: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            layout: "standard".to_string(),
            custom_layout: None,
            with_profile: false,
            parallel: true,
        }
    }
}

impl ExtractionSettings {
    pub fn parser_layout(&self) -> AppResult<ParserLayout> {
        let layout = match &self.custom_layout {
            Some(custom) => custom.clone(),
            None => ParserLayout::preset(&self.layout)?,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn schema(&self) -> Schema {
        if self.with_profile {
            Schema::FULL
        } else {
            Schema::BASE
        }
    }
}

/// Binary-log vent diameter sweep replacing the grid's explicit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiameterSweep {
    pub min_m: f64,
    pub max_m: f64,
    pub interval_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckSettings {
    pub grid: ParameterGrid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter_sweep: Option<DiameterSweep>,
    pub vent: VentProperties,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            grid: ParameterGrid::default(),
            diameter_sweep: Some(DiameterSweep {
                min_m: 1.0,
                max_m: 44000.0,
                interval_size: 6,
            }),
            vent: VentProperties::default(),
            input_dir: PathBuf::from("inp"),
            output_dir: PathBuf::from("out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    pub timeout_s: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            executable: None,
            timeout_s: 0.5,
        }
    }
}

impl SimulatorSettings {
    /// Positive, finite, and representable as a `Duration`.
    pub fn timeout(&self) -> AppResult<Duration> {
        if !(self.timeout_s.is_finite() && self.timeout_s > 0.0) {
            return Err(AppError::InvalidInput(format!(
                "Simulator timeout must be positive, got {} s",
                self.timeout_s
            )));
        }
        Duration::try_from_secs_f64(self.timeout_s).map_err(|e| {
            AppError::InvalidInput(format!(
                "Simulator timeout {} s is out of range: {}",
                self.timeout_s, e
            ))
        })
    }
}

/// Everything the pipeline needs, persisted as YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub version: u32,
    pub extraction: ExtractionSettings,
    pub derivation: DeriveOptions,
    pub regime: RegimeClassifier,
    pub borders: BorderConditions,
    pub decks: DeckSettings,
    pub simulator: SimulatorSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            extraction: ExtractionSettings::default(),
            derivation: DeriveOptions::default(),
            regime: RegimeClassifier::default(),
            borders: BorderConditions::default(),
            decks: DeckSettings::default(),
            simulator: SimulatorSettings::default(),
        }
    }
}

/// Load config from a YAML file.
pub fn load_config(path: &Path) -> AppResult<PipelineConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: PipelineConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;

    Ok(config)
}

/// Load config if a path is given, otherwise defaults.
pub fn load_or_default(path: Option<&Path>) -> AppResult<PipelineConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(PipelineConfig::default()),
    }
}

/// Save config to a YAML file.
pub fn save_config(path: &Path, config: &PipelineConfig) -> AppResult<()> {
    let content = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Validate every section of the config.
pub fn validate_config(config: &PipelineConfig) -> AppResult<()> {
    if config.version != CONFIG_VERSION {
        return Err(AppError::Validation(format!(
            "Unsupported config version {} (expected {})",
            config.version, CONFIG_VERSION
        )));
    }

    config.extraction.parser_layout()?;

    config
        .derivation
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if config.regime.thresholds.is_empty() {
        return Err(AppError::Validation(
            "Regime threshold table must not be empty".to_string(),
        ));
    }
    for entry in &config.regime.thresholds {
        if !(entry.threshold_km.is_finite() && entry.threshold_km > 0.0) {
            return Err(AppError::Validation(format!(
                "Regime threshold for {} m/s must be positive",
                entry.velocity_mps
            )));
        }
    }

    config
        .decks
        .grid
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if let Some(sweep) = &config.decks.diameter_sweep {
        pf_deck::binary_log_diameters(sweep.min_m, sweep.max_m, sweep.interval_size)
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }

    config.simulator.timeout()?;

    Ok(())
}
