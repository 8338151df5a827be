//! Date-intersection alignment of two series.

use crate::error::Result;
use crate::table::{DATE_COL, TimeSeriesTable};
use chrono::NaiveDate;
use polars::prelude::*;

/// Two series restricted to their common dates.
///
/// Both sides share an identical ascending date sequence and equal length for
/// the lifetime of the pair; only [`align`] produces values of this type.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    left: TimeSeriesTable,
    right: TimeSeriesTable,
}

impl AlignedPair {
    /// The aligned left series.
    pub const fn left(&self) -> &TimeSeriesTable {
        &self.left
    }

    /// The aligned right series.
    pub const fn right(&self) -> &TimeSeriesTable {
        &self.right
    }

    /// Number of common dates.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether the intersection was empty.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// The shared date sequence.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        self.left.dates()
    }
}

/// Restrict two series to the dates present in both.
///
/// The date intersection is computed once and each input is inner-joined
/// against it, so both outputs carry exactly the same ascending dates. An
/// empty intersection yields an empty pair, not an error; callers must check
/// [`AlignedPair::is_empty`] before correlating.
pub fn align(a: &TimeSeriesTable, b: &TimeSeriesTable) -> Result<AlignedPair> {
    let common = a
        .frame()
        .clone()
        .lazy()
        .select([col(DATE_COL)])
        .join(
            b.frame().clone().lazy().select([col(DATE_COL)]),
            [col(DATE_COL)],
            [col(DATE_COL)],
            JoinArgs::new(JoinType::Inner),
        );

    let restrict = |table: &TimeSeriesTable| -> Result<DataFrame> {
        Ok(table
            .frame()
            .clone()
            .lazy()
            .join(
                common.clone(),
                [col(DATE_COL)],
                [col(DATE_COL)],
                JoinArgs::new(JoinType::Inner),
            )
            .sort([DATE_COL], SortMultipleOptions::default())
            .collect()?)
    };

    Ok(AlignedPair {
        left: TimeSeriesTable::new_unchecked(a.name().to_string(), restrict(a)?),
        right: TimeSeriesTable::new_unchecked(b.name().to_string(), restrict(b)?),
    })
}
