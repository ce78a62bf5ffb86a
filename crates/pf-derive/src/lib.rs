//! pf-derive: derived plume quantities and regime labels.
//!
//! Provides:
//! - physics (reduced gravity, Richardson number, vent rescaling on uom types)
//! - derived (the enriched table: baselines, grouping, height deltas)
//! - regime (velocity-dependent collapse/buoyant classification)
//! - borders (collapse border detection on plume-height jumps)

pub mod borders;
pub mod derived;
pub mod error;
pub mod physics;
pub mod regime;

pub use borders::{
    BorderConditions, BorderPoint, border_multiplier, detect_borders, representative_borders,
};
pub use derived::{
    DeriveOptions, DerivedField, DerivedRow, DerivedTable, GroupKey, derive_table, dry_mixture_density,
};
pub use error::{DeriveError, DeriveResult};
pub use regime::{Regime, RegimeClassifier, ThresholdEntry, classify};
