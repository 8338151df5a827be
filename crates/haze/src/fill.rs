//! Gap-filling strategies for a single series.

use crate::error::Result;
use crate::table::{TimeSeriesTable, VALUE_COL};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// How missing values in a series are resolved.
///
/// A closed enumeration: callers pick a strategy at configuration time rather
/// than dispatching on strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapFillStrategy {
    /// Each missing value takes the most recent preceding observation.
    /// Leading gaps stay missing.
    #[default]
    ForwardFill,
    /// Missing values are linearly interpolated between the nearest
    /// observations on either side. One-sided gaps stay missing.
    Interpolate,
    /// Rows with missing values are removed.
    Drop,
}

/// Apply a gap-filling strategy to a table.
///
/// Observed values are never altered. Row count is preserved for
/// [`GapFillStrategy::ForwardFill`] and [`GapFillStrategy::Interpolate`] and
/// may shrink for [`GapFillStrategy::Drop`].
pub fn fill(table: &TimeSeriesTable, strategy: GapFillStrategy) -> Result<TimeSeriesTable> {
    let lf = table.frame().clone().lazy();
    let lf = match strategy {
        GapFillStrategy::ForwardFill => lf.with_column(col(VALUE_COL).forward_fill(None)),
        GapFillStrategy::Interpolate => {
            lf.with_column(col(VALUE_COL).interpolate(InterpolationMethod::Linear))
        }
        GapFillStrategy::Drop => lf.filter(col(VALUE_COL).is_not_null()),
    };
    Ok(TimeSeriesTable::new_unchecked(
        table.name().to_string(),
        lf.collect()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn gappy() -> TimeSeriesTable {
        TimeSeriesTable::from_pairs(
            "aqi",
            vec![
                (d(1), None),
                (d(2), Some(10.0)),
                (d(3), None),
                (d(4), Some(30.0)),
                (d(5), None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_forward_fill_carries_last_observation() {
        let filled = fill(&gappy(), GapFillStrategy::ForwardFill).unwrap();
        assert_eq!(
            filled.values().unwrap(),
            vec![None, Some(10.0), Some(10.0), Some(30.0), Some(30.0)]
        );
    }

    #[test]
    fn test_interpolate_leaves_one_sided_gaps() {
        let filled = fill(&gappy(), GapFillStrategy::Interpolate).unwrap();
        assert_eq!(
            filled.values().unwrap(),
            vec![None, Some(10.0), Some(20.0), Some(30.0), None]
        );
    }

    #[test]
    fn test_drop_removes_missing_rows() {
        let filled = fill(&gappy(), GapFillStrategy::Drop).unwrap();
        assert_eq!(filled.dates().unwrap(), vec![d(2), d(4)]);
        assert_eq!(filled.values().unwrap(), vec![Some(10.0), Some(30.0)]);
    }

    #[rstest]
    #[case(GapFillStrategy::ForwardFill)]
    #[case(GapFillStrategy::Interpolate)]
    fn test_row_count_preserved(#[case] strategy: GapFillStrategy) {
        let table = gappy();
        let filled = fill(&table, strategy).unwrap();
        assert_eq!(filled.len(), table.len());
    }

    #[rstest]
    #[case(GapFillStrategy::ForwardFill)]
    #[case(GapFillStrategy::Interpolate)]
    #[case(GapFillStrategy::Drop)]
    fn test_observed_values_unaltered(#[case] strategy: GapFillStrategy) {
        let table = gappy();
        let filled = fill(&table, strategy).unwrap();

        let before: Vec<_> = table
            .dates()
            .unwrap()
            .into_iter()
            .zip(table.values().unwrap())
            .filter_map(|(date, v)| v.map(|v| (date, v)))
            .collect();
        let after: Vec<_> = filled
            .dates()
            .unwrap()
            .into_iter()
            .zip(filled.values().unwrap())
            .collect();

        for (date, value) in before {
            assert!(after.contains(&(date, Some(value))));
        }
    }

    #[test]
    fn test_all_missing_is_a_no_op_for_interpolate() {
        let table =
            TimeSeriesTable::from_pairs("aqi", vec![(d(1), None), (d(2), None)]).unwrap();
        let filled = fill(&table, GapFillStrategy::Interpolate).unwrap();
        assert_eq!(filled.values().unwrap(), vec![None, None]);
    }

    #[test]
    fn test_fill_empty_table() {
        let table = TimeSeriesTable::from_pairs("aqi", Vec::new()).unwrap();
        let filled = fill(&table, GapFillStrategy::ForwardFill).unwrap();
        assert!(filled.is_empty());
    }
}
