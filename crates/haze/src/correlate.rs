//! Pearson correlation over an aligned pair.

use crate::align::AlignedPair;
use thiserror::Error;

/// Conditions under which no correlation is computable.
///
/// Every variant means "undefined", never a crash: callers surface the cause
/// and render the rest of the dashboard without a coefficient.
#[derive(Debug, Error)]
pub enum CorrelationError {
    /// Fewer than two complete observation pairs
    #[error("fewer than two complete observation pairs ({actual})")]
    TooFewPoints {
        /// Number of complete pairs supplied
        actual: usize,
    },

    /// One series is constant, so the denominator is zero
    #[error("series '{series}' has zero variance")]
    ZeroVariance {
        /// The constant series
        series: String,
    },

    /// Inputs are not the same length
    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Left series length
        left: usize,
        /// Right series length
        right: usize,
    },

    /// Underlying column access failed
    #[error("series access error: {0}")]
    Access(String),
}

/// Pearson correlation coefficient of two equal-length series.
///
/// Covariance divided by the product of the standard deviations. The result
/// is in [-1, 1] whenever both inputs have nonzero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, CorrelationError> {
    if xs.len() != ys.len() {
        return Err(CorrelationError::LengthMismatch {
            left: xs.len(),
            right: ys.len(),
        });
    }
    let n = xs.len();
    if n < 2 {
        return Err(CorrelationError::TooFewPoints { actual: n });
    }

    let n_f = n as f64;
    let mean_x = xs.iter().sum::<f64>() / n_f;
    let mean_y = ys.iter().sum::<f64>() / n_f;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 {
        return Err(CorrelationError::ZeroVariance {
            series: "x".to_string(),
        });
    }
    if var_y == 0.0 {
        return Err(CorrelationError::ZeroVariance {
            series: "y".to_string(),
        });
    }

    Ok(covariance / (var_x.sqrt() * var_y.sqrt()))
}

/// Correlate the two sides of an aligned pair.
///
/// Pairs where either observation is missing are dropped before the formula
/// is applied; what remains must still contain at least two complete pairs.
pub fn correlate(pair: &AlignedPair) -> Result<f64, CorrelationError> {
    let left = pair
        .left()
        .values()
        .map_err(|e| CorrelationError::Access(e.to_string()))?;
    let right = pair
        .right()
        .values()
        .map_err(|e| CorrelationError::Access(e.to_string()))?;

    let (xs, ys): (Vec<f64>, Vec<f64>) = left
        .into_iter()
        .zip(right)
        .filter_map(|observations| match observations {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        })
        .unzip();

    pearson(&xs, &ys).map_err(|e| match e {
        // Re-label the generic axis names with the actual series.
        CorrelationError::ZeroVariance { series } => CorrelationError::ZeroVariance {
            series: if series == "x" {
                pair.left().name().to_string()
            } else {
                pair.right().name().to_string()
            },
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::table::TimeSeriesTable;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn table(name: &str, values: &[Option<f64>]) -> TimeSeriesTable {
        TimeSeriesTable::from_pairs(
            name,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (d(i as u32 + 1), *v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_pearson_identical_series() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let r = pearson(&xs, &xs).unwrap();
        assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_mean_centered_negation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 5.0 - x).collect();
        let r = pearson(&xs, &ys).unwrap();
        assert_abs_diff_eq!(r, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_known_value() {
        // Hand-checked: covariance 8, variances 10 and 8.8, so r = 2*sqrt(22)/11.
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 6.0];
        let r = pearson(&xs, &ys).unwrap();
        assert_abs_diff_eq!(r, 0.852_802_865_422_442, epsilon = 1e-12);
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&[1.0], &[2.0])]
    fn test_pearson_too_few_points(#[case] xs: &[f64], #[case] ys: &[f64]) {
        assert!(matches!(
            pearson(xs, ys),
            Err(CorrelationError::TooFewPoints { .. })
        ));
    }

    #[test]
    fn test_pearson_zero_variance() {
        let xs = [3.0, 3.0, 3.0];
        let ys = [1.0, 2.0, 3.0];
        assert!(matches!(
            pearson(&xs, &ys),
            Err(CorrelationError::ZeroVariance { .. })
        ));
    }

    #[test]
    fn test_pearson_length_mismatch() {
        assert!(matches!(
            pearson(&[1.0, 2.0], &[1.0]),
            Err(CorrelationError::LengthMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn test_pearson_stays_in_range() {
        let xs = [12.3, 4.2, 9.9, 15.1, 3.3, 8.8];
        let ys = [100.0, 42.5, 77.1, 60.0, 12.0, 91.4];
        let r = pearson(&xs, &ys).unwrap();
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn test_correlate_drops_incomplete_pairs() {
        // Row 3 is missing on the left; the remaining pairs are perfectly linear.
        let a = table("aqi", &[Some(10.0), Some(20.0), None, Some(40.0)]);
        let b = table("close", &[Some(100.0), Some(200.0), Some(300.0), Some(400.0)]);
        let pair = align(&a, &b).unwrap();

        let r = correlate(&pair).unwrap();
        assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_correlate_empty_pair_is_undefined() {
        let a = table("aqi", &[Some(1.0)]);
        let b = TimeSeriesTable::from_pairs("close", Vec::new()).unwrap();
        let pair = align(&a, &b).unwrap();

        assert!(matches!(
            correlate(&pair),
            Err(CorrelationError::TooFewPoints { actual: 0 })
        ));
    }

    #[test]
    fn test_correlate_names_constant_series() {
        let a = table("aqi", &[Some(5.0), Some(5.0), Some(5.0)]);
        let b = table("close", &[Some(1.0), Some(2.0), Some(3.0)]);
        let pair = align(&a, &b).unwrap();

        match correlate(&pair) {
            Err(CorrelationError::ZeroVariance { series }) => assert_eq!(series, "aqi"),
            other => panic!("expected zero-variance error, got {other:?}"),
        }
    }
}
