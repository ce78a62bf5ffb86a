//! Parameter grids.

use crate::{DeckError, DeckResult};
use serde::{Deserialize, Serialize};

/// Inputs of one simulator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// `run1`, `run2`, ... in generation order.
    pub name: String,
    pub vent_diameter_m: f64,
    pub water_fraction: f64,
    pub magma_temperature_c: f64,
    pub vent_velocity_mps: f64,
    /// Relative humidity, percent.
    pub humidity_pct: f64,
}

/// Value lists swept as a full cartesian product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterGrid {
    pub vent_diameters_m: Vec<f64>,
    pub water_fractions: Vec<f64>,
    pub magma_temperatures_c: Vec<f64>,
    pub vent_velocities_mps: Vec<f64>,
    pub humidities_pct: Vec<f64>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            vent_diameters_m: Vec::new(),
            water_fractions: (0..=20).map(|w| w as f64 / 100.0).collect(),
            magma_temperatures_c: vec![900.0],
            vent_velocities_mps: vec![100.0],
            humidities_pct: vec![0.0],
        }
    }
}

impl ParameterGrid {
    /// Number of runs the grid expands to.
    pub fn len(&self) -> usize {
        self.vent_diameters_m.len()
            * self.water_fractions.len()
            * self.magma_temperatures_c.len()
            * self.vent_velocities_mps.len()
            * self.humidities_pct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> DeckResult<()> {
        let all = [
            &self.vent_diameters_m,
            &self.water_fractions,
            &self.magma_temperatures_c,
            &self.vent_velocities_mps,
            &self.humidities_pct,
        ];
        if all.iter().flat_map(|v| v.iter()).any(|x| !x.is_finite()) {
            return Err(DeckError::InvalidArg {
                what: "grid values must be finite",
            });
        }
        if self.vent_diameters_m.iter().any(|d| *d <= 0.0) {
            return Err(DeckError::InvalidArg {
                what: "vent diameters must be positive",
            });
        }
        if self.water_fractions.iter().any(|w| !(0.0..1.0).contains(w)) {
            return Err(DeckError::InvalidArg {
                what: "water fractions must be in [0, 1)",
            });
        }
        Ok(())
    }

    /// Expand the grid. Diameter varies slowest, humidity fastest.
    pub fn runs(&self) -> Vec<RunSpec> {
        let mut runs = Vec::with_capacity(self.len());
        for &vent_diameter_m in &self.vent_diameters_m {
            for &water_fraction in &self.water_fractions {
                for &magma_temperature_c in &self.magma_temperatures_c {
                    for &vent_velocity_mps in &self.vent_velocities_mps {
                        for &humidity_pct in &self.humidities_pct {
                            runs.push(RunSpec {
                                name: format!("run{}", runs.len() + 1),
                                vent_diameter_m,
                                water_fraction,
                                magma_temperature_c,
                                vent_velocity_mps,
                                humidity_pct,
                            });
                        }
                    }
                }
            }
        }
        runs
    }
}
