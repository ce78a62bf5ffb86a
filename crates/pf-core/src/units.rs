// pf-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Length as UomLength, MassDensity as UomMassDensity,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Density = UomMassDensity;
pub type Length = UomLength;
pub type Velocity = UomVelocity;

#[inline]
pub fn kg_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn mps2(v: f64) -> Accel {
    use uom::si::acceleration::meter_per_second_squared;
    Accel::new::<meter_per_second_squared>(v)
}

pub mod constants {
    use super::*;

    /// Gravity used by the plume analyses (rounded, not standard g0).
    pub const G_MPS2: f64 = 9.81;

    /// Ambient air density at the vent.
    pub const AIR_DENSITY_VENT_KG_M3: f64 = 1.292;

    #[inline]
    pub fn g() -> Accel {
        mps2(G_MPS2)
    }

    #[inline]
    pub fn air_density_vent() -> Density {
        kg_m3(AIR_DENSITY_VENT_KG_M3)
    }
}
