//! End-to-end pipeline scenarios: fill, align, correlate.

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use haze::{CorrelationError, GapFillStrategy, TimeSeriesTable, align, correlate, fill};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

#[test]
fn forward_fill_then_align_then_correlate() {
    // A has a trailing gap; B is complete over the same dates.
    let a = TimeSeriesTable::from_pairs(
        "aqi",
        vec![(d(1), Some(10.0)), (d(2), Some(20.0)), (d(3), None)],
    )
    .unwrap();
    let b = TimeSeriesTable::from_pairs(
        "close",
        vec![(d(1), Some(100.0)), (d(2), Some(200.0)), (d(3), Some(300.0))],
    )
    .unwrap();

    let a_filled = fill(&a, GapFillStrategy::ForwardFill).unwrap();
    assert_eq!(
        a_filled.values().unwrap(),
        vec![Some(10.0), Some(20.0), Some(20.0)]
    );

    // Full overlap: alignment leaves both tables unchanged.
    let pair = align(&a_filled, &b).unwrap();
    assert_eq!(pair.len(), 3);
    assert_eq!(pair.left().values().unwrap(), a_filled.values().unwrap());
    assert_eq!(pair.right().values().unwrap(), b.values().unwrap());

    // (10, 20, 20) vs (100, 200, 300) is not perfectly linear; drop the gap
    // instead and the remaining pairs are.
    let a_dropped = fill(&a, GapFillStrategy::Drop).unwrap();
    let pair = align(&a_dropped, &b).unwrap();
    assert_eq!(pair.len(), 2);
    let r = correlate(&pair).unwrap();
    assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
}

#[test]
fn forward_filled_linear_pair_correlates_to_one() {
    // The spec's walked example: after forward filling, (10, 20, 20) pairs
    // with (100, 200, 200) perfectly linearly.
    let a = TimeSeriesTable::from_pairs(
        "aqi",
        vec![(d(1), Some(10.0)), (d(2), Some(20.0)), (d(3), None)],
    )
    .unwrap();
    let b = TimeSeriesTable::from_pairs(
        "close",
        vec![(d(1), Some(100.0)), (d(2), Some(200.0)), (d(3), Some(200.0))],
    )
    .unwrap();

    let a_filled = fill(&a, GapFillStrategy::ForwardFill).unwrap();
    let pair = align(&a_filled, &b).unwrap();
    let r = correlate(&pair).unwrap();
    assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
}

#[test]
fn daily_vs_trading_day_alignment() {
    // Daily coverage on one side; weekday-only coverage on the other.
    let daily: Vec<_> = (1..=10).map(|day| (d(day), Some(f64::from(day)))).collect();
    let trading: Vec<_> = [1u32, 4, 5, 6, 7, 8]
        .iter()
        .map(|&day| (d(day), Some(f64::from(day) * 10.0)))
        .collect();

    let a = TimeSeriesTable::from_pairs("aqi", daily).unwrap();
    let b = TimeSeriesTable::from_pairs("close", trading).unwrap();

    let pair = align(&a, &b).unwrap();
    assert_eq!(pair.len(), 6);
    assert_eq!(pair.left().dates().unwrap(), pair.right().dates().unwrap());

    let r = correlate(&pair).unwrap();
    assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
}

#[test]
fn empty_intersection_yields_undefined_correlation() {
    let a = TimeSeriesTable::from_pairs("aqi", vec![(d(1), Some(1.0)), (d(2), Some(2.0))])
        .unwrap();
    let b = TimeSeriesTable::from_pairs("close", vec![(d(20), Some(1.0)), (d(21), Some(2.0))])
        .unwrap();

    let pair = align(&a, &b).unwrap();
    assert!(pair.is_empty());
    assert!(matches!(
        correlate(&pair),
        Err(CorrelationError::TooFewPoints { actual: 0 })
    ));
}

#[test]
fn interpolation_recovers_linear_gap_exactly() {
    let a = TimeSeriesTable::from_pairs(
        "aqi",
        vec![(d(1), Some(10.0)), (d(2), None), (d(3), Some(30.0))],
    )
    .unwrap();
    let b = TimeSeriesTable::from_pairs(
        "close",
        vec![(d(1), Some(1.0)), (d(2), Some(2.0)), (d(3), Some(3.0))],
    )
    .unwrap();

    let a_filled = fill(&a, GapFillStrategy::Interpolate).unwrap();
    assert_eq!(a_filled.values().unwrap()[1], Some(20.0));

    let pair = align(&a_filled, &b).unwrap();
    let r = correlate(&pair).unwrap();
    assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
}
