//! The (date, value) table every pipeline stage consumes and produces.

use crate::error::{Result, SeriesError};
use chrono::NaiveDate;
use polars::prelude::*;

/// Name of the date column in every series frame.
pub const DATE_COL: &str = "date";

/// Name of the value column in every series frame.
pub const VALUE_COL: &str = "value";

/// A single named time series.
///
/// Backed by a two-column polars frame (`date: Date`, `value: Float64`) with
/// one row per calendar date, strictly ascending and free of duplicates. A
/// null in the value column is a *missing* observation; an absent row is not
/// (trading-day gaps are absent rows by definition).
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    name: String,
    df: DataFrame,
}

fn epoch_days(date: NaiveDate) -> i32 {
    // Date columns store days since the Unix epoch.
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

impl TimeSeriesTable {
    /// Build a table from (date, value) pairs.
    ///
    /// Rows are sorted by date; a duplicate date is rejected rather than
    /// silently deduplicated.
    pub fn from_pairs(
        name: impl Into<String>,
        mut rows: Vec<(NaiveDate, Option<f64>)>,
    ) -> Result<Self> {
        let name = name.into();
        rows.sort_by_key(|(date, _)| *date);
        for pair in rows.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(SeriesError::DuplicateDate {
                    series: name,
                    date: pair[0].0,
                });
            }
        }

        let days: Vec<i32> = rows.iter().map(|(date, _)| epoch_days(*date)).collect();
        let values: Vec<Option<f64>> = rows.iter().map(|(_, value)| *value).collect();

        let df = DataFrame::new(vec![
            Series::new(DATE_COL.into(), days).into(),
            Series::new(VALUE_COL.into(), values).into(),
        ])?;
        let df = df
            .lazy()
            .with_column(col(DATE_COL).cast(DataType::Date))
            .collect()?;

        Ok(Self { name, df })
    }

    /// Wrap an existing frame, validating schema and date invariants.
    pub fn from_frame(name: impl Into<String>, df: DataFrame) -> Result<Self> {
        let name = name.into();

        let date_dtype = df.column(DATE_COL)?.dtype().clone();
        if date_dtype != DataType::Date {
            return Err(SeriesError::InvalidFrame {
                series: name,
                reason: format!("'{}' column has dtype {}, expected Date", DATE_COL, date_dtype),
            });
        }
        let df = df
            .lazy()
            .select([col(DATE_COL), col(VALUE_COL).cast(DataType::Float64)])
            .collect()?;

        let table = Self { name, df };
        let dates = table.dates()?;
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(SeriesError::InvalidFrame {
                    series: table.name,
                    reason: format!("dates not strictly ascending at {}", pair[1]),
                });
            }
        }
        Ok(table)
    }

    /// Construct from a frame already known to satisfy the invariants.
    pub(crate) const fn new_unchecked(name: String, df: DataFrame) -> Self {
        Self { name, df }
    }

    /// Series name, used in charts, exports and error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying polars frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        let dates = self.df.column(DATE_COL)?.cast(&DataType::String)?;
        let dates = dates.str()?;
        dates
            .into_iter()
            .map(|value| {
                let value = value.ok_or_else(|| SeriesError::InvalidFrame {
                    series: self.name.clone(),
                    reason: "null date".to_string(),
                })?;
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
                    SeriesError::InvalidFrame {
                        series: self.name.clone(),
                        reason: format!("bad date '{value}': {e}"),
                    }
                })
            })
            .collect()
    }

    /// Values in date order; `None` marks a missing observation.
    pub fn values(&self) -> Result<Vec<Option<f64>>> {
        let ca = self.df.column(VALUE_COL)?.f64()?;
        Ok(ca.into_iter().collect())
    }

    /// Number of missing observations.
    pub fn missing_count(&self) -> Result<usize> {
        Ok(self.df.column(VALUE_COL)?.null_count())
    }

    /// Day span between the first and last date, if any rows exist.
    ///
    /// A table loaded for a window of W days should span close to W, with
    /// slack for trading-day gaps at either end.
    pub fn span_days(&self) -> Result<Option<i64>> {
        let dates = self.dates()?;
        Ok(match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => Some(last.signed_duration_since(*first).num_days()),
            _ => None,
        })
    }
}
