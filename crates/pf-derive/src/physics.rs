//! Plume formulas on SI quantities.

use pf_core::{Accel, Density, Length, Velocity};

/// `g' = g (rho_mix - rho_air) / rho_air`
pub fn reduced_gravity(rho_mix: Density, rho_air: Density, g: Accel) -> Accel {
    let excess = (rho_mix - rho_air) / rho_air;
    g * excess.value
}

/// `Ri = g' D / u^2`
pub fn richardson(g_prime: Accel, diameter: Length, velocity: Velocity) -> f64 {
    (g_prime * diameter / (velocity * velocity)).value
}

/// Vent diameter rescaled to the dry mixture density:
/// `D sqrt(rho_mix (1 - w) / rho_dry)`.
pub fn equivalent_vent_diameter(
    diameter: Length,
    rho_mix: Density,
    water_fraction: f64,
    rho_dry: Density,
) -> Length {
    let scale = (rho_mix * (1.0 - water_fraction) / rho_dry).value;
    diameter * scale.sqrt()
}

/// Mass flux of the erupted mixture without the added water: `M (1 - w)`.
pub fn net_mass_flux(total: f64, water_fraction: f64) -> f64 {
    total * (1.0 - water_fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{constants, kg_m3, m, mps};

    #[test]
    fn reduced_gravity_of_air_is_zero() {
        let air = constants::air_density_vent();
        let g = reduced_gravity(air, air, constants::g());
        assert_eq!(g.value, 0.0);
    }

    #[test]
    fn reduced_gravity_matches_formula() {
        let gp = reduced_gravity(kg_m3(2.584), kg_m3(1.292), constants::g());
        assert!((gp.value - 9.81).abs() < 1e-12);
    }

    #[test]
    fn richardson_is_dimensionless_ratio() {
        let ri = richardson(pf_core::mps2(10.0), m(40.0), mps(20.0));
        assert!((ri - 1.0).abs() < 1e-12);
    }

    #[test]
    fn equivalent_diameter_for_wet_run() {
        let d = equivalent_vent_diameter(m(50.0), kg_m3(1200.0), 0.1, kg_m3(2400.0));
        assert!((d.value - 50.0 * 0.45_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn dry_net_flux_is_total() {
        assert_eq!(net_mass_flux(1.0e8, 0.0), 1.0e8);
        assert!((net_mass_flux(1.0e8, 0.2) - 8.0e7).abs() < 1e-6);
    }
}
