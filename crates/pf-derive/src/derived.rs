//! Derived columns computed over a whole assembled dataset.
//!
//! Two lookups span rows and fix the order of work:
//! 1. the global dry mixture density (first zero-water row), needed to
//!    rescale every vent diameter;
//! 2. the per-group dry plume height, keyed on the rescaled diameter.
//!
//! Everything after that is row-local.

use crate::physics;
use crate::regime::{Regime, RegimeClassifier};
use crate::{DeriveError, DeriveResult};
use pf_core::{Dataset, Field, RunRecord, Schema, finite, kg_m3, m, mps, mps2, round_half_even};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Physical constants and knobs for derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveOptions {
    pub gravity_mps2: f64,
    pub ambient_air_density_kg_m3: f64,
    /// Decimal places kept on the rescaled vent diameter (grouping key).
    pub diameter_decimals: i32,
    /// Rows at or above this net mass flux (kg/s) never serve as a dry
    /// baseline for their group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_mass_flux_limit: Option<f64>,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            gravity_mps2: pf_core::constants::G_MPS2,
            ambient_air_density_kg_m3: pf_core::constants::AIR_DENSITY_VENT_KG_M3,
            diameter_decimals: 1,
            baseline_mass_flux_limit: None,
        }
    }
}

impl DeriveOptions {
    pub fn validate(&self) -> DeriveResult<()> {
        if !(self.gravity_mps2.is_finite() && self.gravity_mps2 > 0.0) {
            return Err(DeriveError::InvalidOption {
                what: "gravity must be positive",
            });
        }
        if !(self.ambient_air_density_kg_m3.is_finite() && self.ambient_air_density_kg_m3 > 0.0) {
            return Err(DeriveError::InvalidOption {
                what: "ambient air density must be positive",
            });
        }
        if !(0..=6).contains(&self.diameter_decimals) {
            return Err(DeriveError::InvalidOption {
                what: "diameter decimals must be in 0..=6",
            });
        }
        Ok(())
    }
}

/// Columns appended to every run record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DerivedField {
    NetMassFlux,
    AdjustedVentDiameter,
    DryPlumeHeight,
    DeltaHeight,
    DeltaSparksHeight,
    DensityRatio,
    ReducedGravity,
    Richardson,
}

impl DerivedField {
    pub const ALL: [DerivedField; 8] = [
        DerivedField::NetMassFlux,
        DerivedField::AdjustedVentDiameter,
        DerivedField::DryPlumeHeight,
        DerivedField::DeltaHeight,
        DerivedField::DeltaSparksHeight,
        DerivedField::DensityRatio,
        DerivedField::ReducedGravity,
        DerivedField::Richardson,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DerivedField::NetMassFlux => "mass flux (kg/s)",
            DerivedField::AdjustedVentDiameter => "vent equivalent init (m)",
            DerivedField::DryPlumeHeight => "dry plume height (km)",
            DerivedField::DeltaHeight => "delta z (km)",
            DerivedField::DeltaSparksHeight => "delta z from sparks z (km)",
            DerivedField::DensityRatio => "density ratio",
            DerivedField::ReducedGravity => "g prime (m/s2)",
            DerivedField::Richardson => "Ri",
        }
    }
}

/// A run record with its derived columns and regime label.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub record: RunRecord,
    pub net_mass_flux: Option<f64>,
    pub adjusted_vent_diameter: Option<f64>,
    pub dry_plume_height: Option<f64>,
    pub delta_height: Option<f64>,
    pub delta_sparks_height: Option<f64>,
    pub density_ratio: Option<f64>,
    pub reduced_gravity: Option<f64>,
    pub richardson: Option<f64>,
    /// `None` when the run's velocity has no regime threshold.
    pub regime: Option<Regime>,
}

impl DerivedRow {
    pub fn get(&self, field: DerivedField) -> Option<f64> {
        match field {
            DerivedField::NetMassFlux => self.net_mass_flux,
            DerivedField::AdjustedVentDiameter => self.adjusted_vent_diameter,
            DerivedField::DryPlumeHeight => self.dry_plume_height,
            DerivedField::DeltaHeight => self.delta_height,
            DerivedField::DeltaSparksHeight => self.delta_sparks_height,
            DerivedField::DensityRatio => self.density_ratio,
            DerivedField::ReducedGravity => self.reduced_gravity,
            DerivedField::Richardson => self.richardson,
        }
    }

    /// Grouping key for the dry plume height lookup.
    pub fn group_key(&self) -> Option<GroupKey> {
        Some(GroupKey::new(
            self.record.get(Field::InitialVelocity)?,
            self.record.get(Field::MagmaTemperature)?,
            self.adjusted_vent_diameter?,
        ))
    }
}

/// (initial velocity, magma temperature, rounded adjusted diameter), compared
/// bit-exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey([u64; 3]);

impl GroupKey {
    pub fn new(velocity: f64, temperature: f64, diameter: f64) -> Self {
        // + 0.0 folds -0.0 into 0.0
        let bits = |v: f64| (v + 0.0).to_bits();
        Self([bits(velocity), bits(temperature), bits(diameter)])
    }
}

/// The enriched dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub schema: Schema,
    /// Mixture density of the first zero-water run.
    pub dry_mixture_density: f64,
    pub rows: Vec<DerivedRow>,
    /// Sources whose velocity had no regime threshold.
    pub unclassified: Vec<String>,
}

impl DerivedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn is_dry(record: &RunRecord) -> bool {
    record.get(Field::ExternalWater) == Some(0.0)
}

/// Mixture density of the first zero-water record, in dataset order.
pub fn dry_mixture_density(dataset: &Dataset) -> DeriveResult<f64> {
    let dry = dataset
        .iter()
        .find(|r| is_dry(r))
        .ok_or(DeriveError::MissingDryBaseline)?;
    dry.get(Field::MixtureDensity)
        .filter(|rho| *rho > 0.0)
        .ok_or_else(|| DeriveError::InvalidDryBaseline {
            source_name: dry.source.clone(),
        })
}

/// Row-local columns that do not depend on group baselines.
fn derive_row(record: &RunRecord, rho_dry: f64, options: &DeriveOptions) -> DerivedRow {
    let w = record.get(Field::ExternalWater);
    let rho_mix = record.get(Field::MixtureDensity);
    let velocity = record.get(Field::InitialVelocity);

    let net_mass_flux = record
        .get(Field::TotalMassFlux)
        .zip(w)
        .and_then(|(total, w)| finite(physics::net_mass_flux(total, w)));

    let adjusted_vent_diameter = match (record.get(Field::VentDiameter), rho_mix, w) {
        (Some(d), Some(rho), Some(w)) => {
            let eq = physics::equivalent_vent_diameter(m(d), kg_m3(rho), w, kg_m3(rho_dry));
            finite(round_half_even(eq.value, options.diameter_decimals))
        }
        _ => None,
    };

    let rho_air = kg_m3(options.ambient_air_density_kg_m3);
    let reduced_gravity = rho_mix.map(|rho| {
        physics::reduced_gravity(kg_m3(rho), rho_air, mps2(options.gravity_mps2))
    });
    let richardson = match (reduced_gravity, adjusted_vent_diameter, velocity) {
        (Some(gp), Some(d), Some(u)) => finite(physics::richardson(gp, m(d), mps(u))),
        _ => None,
    };

    let plume_height = record.get(Field::PlumeHeight);
    let delta_sparks_height = plume_height
        .zip(record.get(Field::SparksHeight))
        .map(|(z, s)| z - s);

    DerivedRow {
        record: record.clone(),
        net_mass_flux,
        adjusted_vent_diameter,
        dry_plume_height: None,
        delta_height: None,
        delta_sparks_height,
        density_ratio: rho_mix.and_then(|rho| finite(rho / options.ambient_air_density_kg_m3)),
        reduced_gravity: reduced_gravity.and_then(|gp| finite(gp.value)),
        richardson,
        regime: None,
    }
}

/// Compute every derived column and the regime label for each row.
///
/// Fails only when the dataset has no usable dry baseline run. Groups without
/// a dry member leave their dry height and delta missing.
pub fn derive_table(
    dataset: &Dataset,
    options: &DeriveOptions,
    classifier: &RegimeClassifier,
) -> DeriveResult<DerivedTable> {
    options.validate()?;
    let rho_dry = dry_mixture_density(dataset)?;
    tracing::debug!(rho_dry, rows = dataset.len(), "deriving table");

    let mut rows: Vec<DerivedRow> = dataset
        .iter()
        .map(|r| derive_row(r, rho_dry, options))
        .collect();

    // First eligible dry member of each group supplies the baseline.
    let mut dry_heights: HashMap<GroupKey, Option<f64>> = HashMap::new();
    for row in &rows {
        if !is_dry(&row.record) {
            continue;
        }
        if let Some(limit) = options.baseline_mass_flux_limit
            && row.net_mass_flux.is_none_or(|flux| flux >= limit)
        {
            continue;
        }
        if let Some(key) = row.group_key() {
            dry_heights
                .entry(key)
                .or_insert(row.record.get(Field::PlumeHeight));
        }
    }

    let mut unclassified = Vec::new();
    for row in &mut rows {
        row.dry_plume_height = row
            .group_key()
            .and_then(|key| dry_heights.get(&key).copied().flatten());
        row.delta_height = row
            .record
            .get(Field::PlumeHeight)
            .zip(row.dry_plume_height)
            .map(|(z, dry)| z - dry);

        let velocity = row.record.get(Field::InitialVelocity);
        row.regime = classifier.classify(velocity, row.delta_height);
        if row.regime.is_none() {
            tracing::warn!(
                file = %row.record.source,
                velocity = ?velocity,
                "no regime threshold for velocity, row left unclassified"
            );
            unclassified.push(row.record.source.clone());
        }
    }

    Ok(DerivedTable {
        schema: dataset.schema(),
        dry_mixture_density: rho_dry,
        rows,
        unclassified,
    })
}
