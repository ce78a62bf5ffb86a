//! Vent diameter lists.
//!
//! Diameters span several orders of magnitude, so they are laid out in
//! doubling intervals `[2^(x-1), 2^x]`, each filled with the same number of
//! linearly spaced points. Small vents get fine resolution and large vents
//! coarse resolution.

use crate::{DeckError, DeckResult};
use pf_core::round_half_even;

/// Decimal places kept on generated diameters.
pub const DIAMETER_DECIMALS: i32 = 4;

/// `n` evenly spaced points from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let delta = (end - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| start + i as f64 * delta).collect();
            // Exact endpoint
            points[n - 1] = end;
            points
        }
    }
}

/// Binary-log spaced diameters up to `max`.
///
/// Interval `x` (from 1 to `ceil(log2(max))`) runs from `2^x / 2` to
/// `min(2^x, max)`; the first interval starts at 1 instead. Each interval
/// contributes `interval_size` points rounded to 4 decimals. The union is
/// returned ascending without duplicates, minus anything below `min`.
pub fn binary_log_diameters(min: f64, max: f64, interval_size: usize) -> DeckResult<Vec<f64>> {
    if interval_size < 2 {
        return Err(DeckError::InvalidArg {
            what: "interval size must be greater than 1",
        });
    }
    if !(max.is_finite() && max > 0.0) {
        return Err(DeckError::InvalidArg {
            what: "maximum diameter must be positive",
        });
    }
    if !min.is_finite() || min > max {
        return Err(DeckError::InvalidArg {
            what: "minimum diameter must not exceed the maximum",
        });
    }

    let intervals = max.log2().ceil().max(0.0) as i32;
    let mut diameters = Vec::new();
    for x in 1..=intervals {
        let upper = 2f64.powi(x);
        let start = if x == 1 { 1.0 } else { upper / 2.0 };
        let end = upper.min(max);
        diameters.extend(
            linspace(start, end, interval_size)
                .into_iter()
                .map(|d| round_half_even(d, DIAMETER_DECIMALS)),
        );
    }

    diameters.retain(|d| *d >= min);
    diameters.sort_by(f64::total_cmp);
    diameters.dedup();
    Ok(diameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn linspace_endpoints() {
        assert_eq!(linspace(1.0, 2.0, 3), vec![1.0, 1.5, 2.0]);
        assert_eq!(linspace(4.0, 6.0, 1), vec![4.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn doubling_intervals_merge() {
        let d = binary_log_diameters(1.0, 8.0, 3).unwrap();
        assert_eq!(d, vec![1.0, 1.5, 2.0, 3.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn last_interval_capped_at_max() {
        let d = binary_log_diameters(1.0, 6.0, 3).unwrap();
        assert_eq!(d, vec![1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn rounded_to_four_decimals() {
        let d = binary_log_diameters(1.0, 2.0, 4).unwrap();
        assert_eq!(d, vec![1.0, 1.3333, 1.6667, 2.0]);
    }

    #[test]
    fn min_filters_small_vents() {
        let d = binary_log_diameters(3.0, 8.0, 3).unwrap();
        assert_eq!(d, vec![3.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(binary_log_diameters(1.0, 8.0, 1).is_err());
        assert!(binary_log_diameters(1.0, 0.0, 3).is_err());
        assert!(binary_log_diameters(10.0, 8.0, 3).is_err());
        assert!(binary_log_diameters(1.0, f64::NAN, 3).is_err());
    }

    #[test]
    fn max_of_one_has_no_intervals() {
        assert!(binary_log_diameters(0.0, 1.0, 3).unwrap().is_empty());
    }

    mod proptests {
        use super::*;

        proptest! {
            #[test]
            fn strictly_ascending_and_bounded(max in 1.5f64..50_000.0, size in 2usize..12) {
                let d = binary_log_diameters(1.0, max, size).unwrap();
                prop_assert!(d.windows(2).all(|w| w[0] < w[1]));
                prop_assert_eq!(d.first().copied(), Some(1.0));
                prop_assert!(*d.last().unwrap() <= round_half_even(max, DIAMETER_DECIMALS));
            }
        }
    }
}
