//! Human-readable summary of one analysis pass.

use chrono::NaiveDate;
use haze::{AlignedPair, CorrelationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strength bands for the dashboard's interpretation guide.
///
/// Bands follow the usual reading of |r|: at least 0.7 is strong, at least
/// 0.3 is moderate, anything closer to zero is negligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    /// r >= 0.7
    StrongPositive,
    /// 0.3 <= r < 0.7
    ModeratePositive,
    /// -0.3 < r < 0.3
    Negligible,
    /// -0.7 < r <= -0.3
    ModerateNegative,
    /// r <= -0.7
    StrongNegative,
}

impl CorrelationStrength {
    /// Band a coefficient falls into.
    pub fn from_coefficient(r: f64) -> Self {
        if r >= 0.7 {
            Self::StrongPositive
        } else if r >= 0.3 {
            Self::ModeratePositive
        } else if r > -0.3 {
            Self::Negligible
        } else if r > -0.7 {
            Self::ModerateNegative
        } else {
            Self::StrongNegative
        }
    }

    /// One-line reading for the interpretation guide.
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::StrongPositive => "strong positive correlation (the series move together)",
            Self::ModeratePositive => "moderate positive correlation",
            Self::Negligible => "little to no linear relationship",
            Self::ModerateNegative => "moderate negative correlation",
            Self::StrongNegative => {
                "strong negative correlation (the series move in opposite directions)"
            }
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Summary of one dashboard render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Left series name.
    pub left_name: String,

    /// Right series name.
    pub right_name: String,

    /// First common date, if any overlap exists.
    pub period_start: Option<NaiveDate>,

    /// Last common date, if any overlap exists.
    pub period_end: Option<NaiveDate>,

    /// Number of aligned observations.
    pub observations: usize,

    /// Pearson coefficient, absent when undefined.
    pub correlation: Option<f64>,

    /// Strength band, present whenever the coefficient is.
    pub strength: Option<CorrelationStrength>,

    /// Why the coefficient is absent, when it is.
    pub note: Option<String>,
}

impl AnalysisSummary {
    /// Summarize an aligned pair and its correlation outcome.
    pub fn from_outcome(
        pair: &AlignedPair,
        outcome: &Result<f64, CorrelationError>,
    ) -> haze::Result<Self> {
        let dates = pair.dates()?;
        let (correlation, strength, note) = match outcome {
            Ok(r) => (Some(*r), Some(CorrelationStrength::from_coefficient(*r)), None),
            Err(e) => (None, None, Some(e.to_string())),
        };

        Ok(Self {
            left_name: pair.left().name().to_string(),
            right_name: pair.right().name().to_string(),
            period_start: dates.first().copied(),
            period_end: dates.last().copied(),
            observations: pair.len(),
            correlation,
            strength,
            note,
        })
    }
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} vs {}: {} aligned observations",
            self.left_name, self.right_name, self.observations
        )?;
        if let (Some(start), Some(end)) = (self.period_start, self.period_end) {
            writeln!(f, "Period: {} to {}", start, end)?;
        }
        match (self.correlation, self.strength, &self.note) {
            (Some(r), Some(strength), _) => {
                writeln!(f, "Pearson correlation: {:.4} ({})", r, strength)
            }
            (_, _, Some(note)) => writeln!(f, "Correlation undefined: {}", note),
            _ => writeln!(f, "Correlation undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haze::{TimeSeriesTable, align, correlate};
    use rstest::rstest;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[rstest]
    #[case(0.95, CorrelationStrength::StrongPositive)]
    #[case(0.5, CorrelationStrength::ModeratePositive)]
    #[case(0.0, CorrelationStrength::Negligible)]
    #[case(-0.4, CorrelationStrength::ModerateNegative)]
    #[case(-0.9, CorrelationStrength::StrongNegative)]
    fn test_strength_bands(#[case] r: f64, #[case] expected: CorrelationStrength) {
        assert_eq!(CorrelationStrength::from_coefficient(r), expected);
    }

    #[test]
    fn test_summary_of_defined_correlation() {
        let a = TimeSeriesTable::from_pairs(
            "aqi",
            vec![(d(1), Some(1.0)), (d(2), Some(2.0)), (d(3), Some(3.0))],
        )
        .unwrap();
        let b = TimeSeriesTable::from_pairs(
            "close",
            vec![(d(1), Some(10.0)), (d(2), Some(20.0)), (d(3), Some(30.0))],
        )
        .unwrap();
        let pair = align(&a, &b).unwrap();
        let outcome = correlate(&pair);

        let summary = AnalysisSummary::from_outcome(&pair, &outcome).unwrap();
        assert_eq!(summary.observations, 3);
        assert_eq!(summary.period_start, Some(d(1)));
        assert_eq!(summary.period_end, Some(d(3)));
        assert_eq!(summary.strength, Some(CorrelationStrength::StrongPositive));
        assert!(summary.to_string().contains("1.0000"));
    }

    #[test]
    fn test_summary_of_undefined_correlation() {
        let a = TimeSeriesTable::from_pairs("aqi", vec![(d(1), Some(1.0))]).unwrap();
        let b = TimeSeriesTable::from_pairs("close", vec![(d(9), Some(1.0))]).unwrap();
        let pair = align(&a, &b).unwrap();
        let outcome = correlate(&pair);

        let summary = AnalysisSummary::from_outcome(&pair, &outcome).unwrap();
        assert_eq!(summary.observations, 0);
        assert_eq!(summary.correlation, None);
        assert!(summary.note.is_some());
        assert!(summary.to_string().contains("Correlation undefined"));
    }
}
