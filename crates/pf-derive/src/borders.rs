//! Collapse border detection.
//!
//! Within one (velocity, temperature, water fraction) slice, sorted by net mass
//! flux, a collapse border shows up as an outsized jump in plume height between
//! neighbouring runs.

use crate::derived::{DerivedRow, DerivedTable};
use pf_core::{Field, population_std_dev};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The (velocity, temperature) conditions scanned for borders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConditions {
    pub velocities_mps: Vec<f64>,
    pub temperatures_c: Vec<f64>,
}

impl Default for BorderConditions {
    fn default() -> Self {
        Self {
            velocities_mps: vec![75.0, 100.0, 125.0],
            temperatures_c: vec![700.0, 900.0, 1100.0],
        }
    }
}

/// Multiple of the jump standard deviation a jump must exceed.
pub fn border_multiplier(water_fraction: f64, temperature_c: f64, velocity_mps: f64) -> f64 {
    if water_fraction >= 0.3 {
        6.0
    } else if temperature_c > 1000.0 && temperature_c < 1100.0 && velocity_mps > 100.0 {
        1.5
    } else if temperature_c == 1000.0 && velocity_mps == 125.0 {
        3.0
    } else {
        8.0
    }
}

/// One row selected as a collapse condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderPoint {
    /// Index into `DerivedTable::rows`.
    pub row: usize,
    pub velocity_mps: f64,
    pub temperature_c: f64,
    pub water_fraction: f64,
    /// Absolute plume height change from the previous run in the slice.
    pub jump_km: f64,
    pub threshold_km: f64,
}

impl BorderPoint {
    pub fn resolve<'a>(&self, table: &'a DerivedTable) -> Option<&'a DerivedRow> {
        table.rows.get(self.row)
    }
}

/// Missing flux sorts last. Used with stable sorts, so ties keep table order.
fn cmp_flux(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn distinct_sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

fn detect_in_slice(
    rows: &[DerivedRow],
    mut slice: Vec<usize>,
    (velocity, temperature, water): (f64, f64, f64),
) -> Vec<BorderPoint> {
    slice.sort_by(|&a, &b| cmp_flux(rows[a].net_mass_flux, rows[b].net_mass_flux));

    let jumps: Vec<Option<f64>> = std::iter::once(None)
        .chain(slice.windows(2).map(|pair| {
            let prev = rows[pair[0]].record.get(Field::PlumeHeight)?;
            let next = rows[pair[1]].record.get(Field::PlumeHeight)?;
            Some((next - prev).abs())
        }))
        .collect();
    let present: Vec<f64> = jumps.iter().flatten().copied().collect();
    let Some(sigma) = population_std_dev(&present) else {
        return Vec::new();
    };
    let threshold = border_multiplier(water, temperature, velocity) * sigma;

    slice
        .iter()
        .zip(&jumps)
        .filter_map(|(&row, jump)| {
            let jump = (*jump)?;
            (jump > threshold).then_some(BorderPoint {
                row,
                velocity_mps: velocity,
                temperature_c: temperature,
                water_fraction: water,
                jump_km: jump,
                threshold_km: threshold,
            })
        })
        .collect()
}

/// Scan every condition and every water fraction present in it.
///
/// Results are ordered by velocity, then temperature, then water fraction
/// ascending, then net mass flux within a slice.
pub fn detect_borders(table: &DerivedTable, conditions: &BorderConditions) -> Vec<BorderPoint> {
    let rows = &table.rows;
    let mut points = Vec::new();

    for &velocity in &conditions.velocities_mps {
        for &temperature in &conditions.temperatures_c {
            let in_condition: Vec<usize> = (0..rows.len())
                .filter(|&i| {
                    let r = &rows[i].record;
                    r.get(Field::InitialVelocity) == Some(velocity)
                        && r.get(Field::MagmaTemperature) == Some(temperature)
                })
                .collect();
            if in_condition.is_empty() {
                continue;
            }

            let waters = distinct_sorted(
                in_condition
                    .iter()
                    .filter_map(|&i| rows[i].record.get(Field::ExternalWater))
                    .collect(),
            );
            for water in waters {
                let slice: Vec<usize> = in_condition
                    .iter()
                    .copied()
                    .filter(|&i| rows[i].record.get(Field::ExternalWater) == Some(water))
                    .collect();
                let found = detect_in_slice(rows, slice, (velocity, temperature, water));
                if !found.is_empty() {
                    tracing::debug!(
                        velocity,
                        temperature,
                        water,
                        count = found.len(),
                        "collapse borders"
                    );
                }
                points.extend(found);
            }
        }
    }

    tracing::info!(borders = points.len(), "collapse border scan finished");
    points
}

/// One representative border per water fraction.
///
/// Fractions above `split` keep their first border in scan order; the rest keep
/// the border with the lowest net mass flux.
pub fn representative_borders(
    table: &DerivedTable,
    points: &[BorderPoint],
    split: f64,
) -> Vec<BorderPoint> {
    let mut high: Vec<BorderPoint> = Vec::new();
    for p in points.iter().filter(|p| p.water_fraction > split) {
        if !high.iter().any(|h| h.water_fraction == p.water_fraction) {
            high.push(*p);
        }
    }

    let mut low_order: Vec<usize> = (0..points.len())
        .filter(|&i| points[i].water_fraction <= split)
        .collect();
    let flux = |i: usize| table.rows.get(points[i].row).and_then(|r| r.net_mass_flux);
    low_order.sort_by(|&a, &b| cmp_flux(flux(a), flux(b)));
    let mut low: Vec<BorderPoint> = Vec::new();
    for p in low_order.into_iter().map(|i| points[i]) {
        if !low.iter().any(|l| l.water_fraction == p.water_fraction) {
            low.push(p);
        }
    }

    high.extend(low);
    high
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{RunRecord, Schema};

    fn row(water: f64, velocity: f64, temp: f64, flux: f64, height: Option<f64>) -> DerivedRow {
        let mut v = vec![None; Field::BASE_WIDTH];
        v[Field::ExternalWater.index()] = Some(water);
        v[Field::InitialVelocity.index()] = Some(velocity);
        v[Field::MagmaTemperature.index()] = Some(temp);
        v[Field::PlumeHeight.index()] = height;
        DerivedRow {
            record: RunRecord::from_values(format!("w{water}_m{flux}"), Schema::BASE, v),
            net_mass_flux: Some(flux),
            adjusted_vent_diameter: None,
            dry_plume_height: None,
            delta_height: None,
            delta_sparks_height: None,
            density_ratio: None,
            reduced_gravity: None,
            richardson: None,
            regime: None,
        }
    }

    fn table(rows: Vec<DerivedRow>) -> DerivedTable {
        DerivedTable {
            schema: Schema::BASE,
            dry_mixture_density: 2400.0,
            rows,
            unclassified: Vec::new(),
        }
    }

    #[test]
    fn multiplier_cases() {
        assert_eq!(border_multiplier(0.3, 900.0, 100.0), 6.0);
        assert_eq!(border_multiplier(0.5, 1050.0, 125.0), 6.0);
        assert_eq!(border_multiplier(0.1, 1050.0, 125.0), 1.5);
        assert_eq!(border_multiplier(0.1, 1050.0, 100.0), 8.0);
        assert_eq!(border_multiplier(0.1, 1000.0, 125.0), 3.0);
        assert_eq!(border_multiplier(0.0, 700.0, 75.0), 8.0);
    }

    #[test]
    fn single_large_jump_is_a_border() {
        // Many small steps, then one collapse; rows given out of flux order.
        let mut rows: Vec<DerivedRow> = (0..100)
            .map(|i| row(0.3, 100.0, 900.0, 1.0e6 * (i + 1) as f64, Some(20.0 + 0.1 * i as f64)))
            .collect();
        rows.push(row(0.3, 100.0, 900.0, 1.0e9, Some(2.0)));
        rows.swap(0, 100);
        let t = table(rows);

        let points = detect_borders(&t, &BorderConditions::default());
        assert_eq!(points.len(), 1);
        let p = points[0];
        assert_eq!(p.row, 0);
        assert_eq!(p.water_fraction, 0.3);
        assert!((p.jump_km - 27.9).abs() < 1e-9);
        assert!(p.jump_km > p.threshold_km);
        assert_eq!(p.resolve(&t).unwrap().net_mass_flux, Some(1.0e9));
    }

    #[test]
    fn steady_steps_have_no_border() {
        // Alternating 1.5 / 0.5 km steps: sigma 0.5, threshold 4.
        let rows = (0..10)
            .map(|i| row(0.1, 75.0, 700.0, i as f64, Some(i as f64 + 0.5 * (i % 2) as f64)))
            .collect();
        assert!(detect_borders(&table(rows), &BorderConditions::default()).is_empty());
    }

    #[test]
    fn flat_slice_flags_any_change() {
        // Zero spread makes the threshold zero.
        let rows = vec![
            row(0.0, 75.0, 700.0, 1.0, Some(10.0)),
            row(0.0, 75.0, 700.0, 2.0, Some(10.0)),
        ];
        assert!(detect_borders(&table(rows), &BorderConditions::default()).is_empty());
    }

    #[test]
    fn slices_and_conditions_are_separate() {
        let rows = vec![
            row(0.0, 100.0, 900.0, 1.0, Some(10.0)),
            row(0.1, 100.0, 900.0, 2.0, Some(50.0)),
            row(0.0, 100.0, 900.0, 3.0, Some(10.0)),
            row(0.0, 150.0, 900.0, 2.0, Some(80.0)),
        ];
        assert!(detect_borders(&table(rows), &BorderConditions::default()).is_empty());
    }

    #[test]
    fn missing_heights_break_jumps() {
        let rows = vec![
            row(0.4, 125.0, 1100.0, 1.0, Some(10.0)),
            row(0.4, 125.0, 1100.0, 2.0, None),
            row(0.4, 125.0, 1100.0, 3.0, Some(40.0)),
        ];
        assert!(detect_borders(&table(rows), &BorderConditions::default()).is_empty());
    }

    #[test]
    fn representatives_one_per_water_fraction() {
        let rows = vec![
            row(0.1, 100.0, 900.0, 5.0, Some(1.0)),
            row(0.1, 100.0, 900.0, 2.0, Some(1.0)),
            row(0.5, 100.0, 900.0, 9.0, Some(1.0)),
            row(0.5, 100.0, 900.0, 1.0, Some(1.0)),
        ];
        let t = table(rows);
        let point = |row: usize, water: f64| BorderPoint {
            row,
            velocity_mps: 100.0,
            temperature_c: 900.0,
            water_fraction: water,
            jump_km: 1.0,
            threshold_km: 0.5,
        };
        let points = [point(0, 0.1), point(1, 0.1), point(2, 0.5), point(3, 0.5)];
        let reps = representative_borders(&t, &points, 0.4);
        let picked: Vec<usize> = reps.iter().map(|p| p.row).collect();
        assert_eq!(picked, [2, 1]);
    }
}
