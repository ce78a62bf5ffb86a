//! Column layout of one simulator run.
//!
//! The order of [`Field::ALL`] is the order values are extracted from an
//! output file, so a field's position in that array is its column index in
//! every [`RunRecord`](crate::RunRecord).

use crate::{CoreError, CoreResult};
use core::fmt;

/// One scalar column of a run record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Field {
    // Header zone
    Humidity,
    AirTemperature,
    AirPressure,
    VentDiameter,
    VentElevation,
    InitialVelocity,
    MagmaTemperature,
    GasFraction,
    MagmaSpecificHeat,
    MagmaDensity,
    MixtureDensity,
    ExternalWater,
    TotalMassFlux,
    // Summary zone
    PlumeHeight,
    SparksHeight,
    MastinHeight,
    // Vertical profile, first data point
    ProfileIndex,
    ProfileHeight,
    MassFracMagma,
    MassFracAir,
    MassFracVapor,
    MassFracLiquid,
    MassFracIce,
    ProfileVelocity,
    ProfileRadius,
    MixtureTemperature,
    ProfileAirTemperature,
    ProfileMixtureDensity,
    ProfileAirDensity,
    ProfileTime,
    ProfileAirPressure,
}

impl Field {
    pub const ALL: [Field; 31] = [
        Field::Humidity,
        Field::AirTemperature,
        Field::AirPressure,
        Field::VentDiameter,
        Field::VentElevation,
        Field::InitialVelocity,
        Field::MagmaTemperature,
        Field::GasFraction,
        Field::MagmaSpecificHeat,
        Field::MagmaDensity,
        Field::MixtureDensity,
        Field::ExternalWater,
        Field::TotalMassFlux,
        Field::PlumeHeight,
        Field::SparksHeight,
        Field::MastinHeight,
        Field::ProfileIndex,
        Field::ProfileHeight,
        Field::MassFracMagma,
        Field::MassFracAir,
        Field::MassFracVapor,
        Field::MassFracLiquid,
        Field::MassFracIce,
        Field::ProfileVelocity,
        Field::ProfileRadius,
        Field::MixtureTemperature,
        Field::ProfileAirTemperature,
        Field::ProfileMixtureDensity,
        Field::ProfileAirDensity,
        Field::ProfileTime,
        Field::ProfileAirPressure,
    ];

    /// Number of columns without the vertical-profile block.
    pub const BASE_WIDTH: usize = 16;

    /// Column index in a full-width record.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Field> {
        Self::ALL.get(index).copied()
    }

    pub fn is_profile(self) -> bool {
        self.index() >= Self::BASE_WIDTH
    }

    /// Stable machine name, used in config files.
    pub fn key(self) -> &'static str {
        match self {
            Field::Humidity => "humidity",
            Field::AirTemperature => "air_temperature",
            Field::AirPressure => "air_pressure",
            Field::VentDiameter => "vent_diameter",
            Field::VentElevation => "vent_elevation",
            Field::InitialVelocity => "initial_velocity",
            Field::MagmaTemperature => "magma_temperature",
            Field::GasFraction => "gas_fraction",
            Field::MagmaSpecificHeat => "magma_specific_heat",
            Field::MagmaDensity => "magma_density",
            Field::MixtureDensity => "mixture_density",
            Field::ExternalWater => "external_water",
            Field::TotalMassFlux => "total_mass_flux",
            Field::PlumeHeight => "plume_height",
            Field::SparksHeight => "sparks_height",
            Field::MastinHeight => "mastin_height",
            Field::ProfileIndex => "inum",
            Field::ProfileHeight => "z",
            Field::MassFracMagma => "m_m",
            Field::MassFracAir => "m_a",
            Field::MassFracVapor => "m_v",
            Field::MassFracLiquid => "m_l",
            Field::MassFracIce => "m_i",
            Field::ProfileVelocity => "u",
            Field::ProfileRadius => "r",
            Field::MixtureTemperature => "t_mix",
            Field::ProfileAirTemperature => "t_air",
            Field::ProfileMixtureDensity => "rho_mix",
            Field::ProfileAirDensity => "rho_air",
            Field::ProfileTime => "time",
            Field::ProfileAirPressure => "p_air",
        }
    }

    /// Human-readable column header with units.
    pub fn label(self) -> &'static str {
        match self {
            Field::Humidity => "relative humidity (%)",
            Field::AirTemperature => "air temperature at vent (C)",
            Field::AirPressure => "air pressure at vent (atm)",
            Field::VentDiameter => "vent diameter (m)",
            Field::VentElevation => "vent elevation (m)",
            Field::InitialVelocity => "initial velocity (m/s)",
            Field::MagmaTemperature => "magma temperature (C)",
            Field::GasFraction => "weight fraction gas",
            Field::MagmaSpecificHeat => "magma specific heat (J/kg K)",
            Field::MagmaDensity => "magma density (kg/m3)",
            Field::MixtureDensity => "mixture density (kg/m3)",
            Field::ExternalWater => "mass fraction water added",
            Field::TotalMassFlux => "mass flux total (kg/s)",
            Field::PlumeHeight => "calculated height (km)",
            Field::SparksHeight => "sparks height (km)",
            Field::MastinHeight => "mastin et al 2009 height (km)",
            Field::ProfileIndex => "inum",
            Field::ProfileHeight => "z",
            Field::MassFracMagma => "m_m",
            Field::MassFracAir => "m_a",
            Field::MassFracVapor => "m_v",
            Field::MassFracLiquid => "m_l",
            Field::MassFracIce => "m_i",
            Field::ProfileVelocity => "u",
            Field::ProfileRadius => "r",
            Field::MixtureTemperature => "T_mix",
            Field::ProfileAirTemperature => "T_air",
            Field::ProfileMixtureDensity => "rho_mix",
            Field::ProfileAirDensity => "rho_air",
            Field::ProfileTime => "time",
            Field::ProfileAirPressure => "p_air",
        }
    }

    pub fn from_key(key: &str) -> CoreResult<Field> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == key)
            .ok_or_else(|| CoreError::UnknownColumn {
                name: key.to_string(),
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which columns a dataset carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schema {
    pub with_profile: bool,
}

impl Schema {
    pub const BASE: Schema = Schema {
        with_profile: false,
    };
    pub const FULL: Schema = Schema { with_profile: true };

    pub fn fields(&self) -> &'static [Field] {
        if self.with_profile {
            &Field::ALL
        } else {
            &Field::ALL[..Field::BASE_WIDTH]
        }
    }

    pub fn width(&self) -> usize {
        self.fields().len()
    }

    pub fn contains(&self, field: Field) -> bool {
        field.index() < self.width()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::BASE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, f) in Field::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
            assert_eq!(Field::from_index(i), Some(*f));
        }
        assert_eq!(Field::from_index(Field::ALL.len()), None);
    }

    #[test]
    fn schema_widths() {
        assert_eq!(Schema::BASE.width(), 16);
        assert_eq!(Schema::FULL.width(), 31);
        assert!(Schema::BASE.contains(Field::MastinHeight));
        assert!(!Schema::BASE.contains(Field::ProfileIndex));
        assert!(Field::ProfileAirPressure.is_profile());
    }

    #[test]
    fn keys_round_trip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for f in Field::ALL {
            assert!(seen.insert(f.key()));
            assert_eq!(Field::from_key(f.key()).unwrap(), f);
        }
        assert!(matches!(
            Field::from_key("nope"),
            Err(CoreError::UnknownColumn { .. })
        ));
    }
}
