//! Collapse/buoyant regime labels.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Where a wet run sits relative to its dry counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regime {
    /// Plume height dropped by more than the threshold.
    Collapsing,
    WeakNegative,
    WeakPositive,
    /// Plume height rose by more than the threshold.
    StronglyBuoyant,
    /// No height delta (no dry sibling, or no change at all).
    Undetermined,
}

impl Regime {
    pub fn label(self) -> &'static str {
        match self {
            Regime::Collapsing => "collapsing",
            Regime::WeakNegative => "weak-negative",
            Regime::WeakPositive => "weak-positive",
            Regime::StronglyBuoyant => "strongly-buoyant",
            Regime::Undetermined => "dry",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a height delta (km) against threshold `t` (km).
///
/// Bounds: `(-inf, -t)` collapsing, `[-t, 0)` weak-negative,
/// `(0, t]` weak-positive, `(t, inf)` strongly-buoyant.
pub fn classify(delta_height: Option<f64>, t: f64) -> Regime {
    match delta_height {
        Some(d) if d > t => Regime::StronglyBuoyant,
        Some(d) if d < -t => Regime::Collapsing,
        Some(d) if d < 0.0 => Regime::WeakNegative,
        Some(d) if d > 0.0 => Regime::WeakPositive,
        _ => Regime::Undetermined,
    }
}

/// Height-delta threshold for one vent velocity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub velocity_mps: f64,
    pub threshold_km: f64,
}

/// Velocity-dependent classifier. Velocities are matched exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegimeClassifier {
    pub thresholds: Vec<ThresholdEntry>,
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self {
            thresholds: vec![
                ThresholdEntry {
                    velocity_mps: 75.0,
                    threshold_km: 3.0,
                },
                ThresholdEntry {
                    velocity_mps: 100.0,
                    threshold_km: 6.0,
                },
                ThresholdEntry {
                    velocity_mps: 125.0,
                    threshold_km: 11.0,
                },
            ],
        }
    }
}

impl RegimeClassifier {
    pub fn threshold_for(&self, velocity_mps: f64) -> Option<f64> {
        self.thresholds
            .iter()
            .find(|e| e.velocity_mps == velocity_mps)
            .map(|e| e.threshold_km)
    }

    /// `None` when the velocity has no threshold; the caller reports it.
    pub fn classify(&self, velocity_mps: Option<f64>, delta_height: Option<f64>) -> Option<Regime> {
        let t = self.threshold_for(velocity_mps?)?;
        Some(classify(delta_height, t))
    }
}
