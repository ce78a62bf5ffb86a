/// Floating point type used throughout the pipeline
pub type Real = f64;

/// Collapse a computed value to `None` unless it is finite.
#[inline]
pub fn finite(v: Real) -> Option<Real> {
    v.is_finite().then_some(v)
}

/// Round to `decimals` places, ties to even.
///
/// Scales, rounds, and unscales, so `33.55` rounds to `33.6` or `33.5`
/// depending on the binary value nearest to `335.5`.
pub fn round_half_even(v: Real, decimals: i32) -> Real {
    let scale = 10f64.powi(decimals);
    (v * scale).round_ties_even() / scale
}

/// Population standard deviation (divides by `n`). `None` for empty input.
pub fn population_std_dev(values: &[Real]) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as Real;
    let mean = values.iter().sum::<Real>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<Real>() / n;
    Some(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(round_half_even(0.25, 1), 0.2);
        assert_eq!(round_half_even(0.75, 1), 0.8);
        assert_eq!(round_half_even(33.541, 1), 33.5);
        assert_eq!(round_half_even(-2.5, 0), -2.0);
    }

    #[test]
    fn std_dev_matches_population_formula() {
        let sd = population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
        assert!(population_std_dev(&[]).is_none());
    }

    #[test]
    fn finite_filters_nan_and_inf() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(Real::NAN), None);
        assert_eq!(finite(Real::INFINITY), None);
    }
}
