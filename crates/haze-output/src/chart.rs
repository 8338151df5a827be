//! Declarative chart specifications.
//!
//! Describes what the dashboard renders (an interactive line chart per
//! series and a scatter plot over the aligned pair) as plain data. The
//! presentation layer owns the actual drawing.

use chrono::NaiveDate;
use haze::{AlignedPair, TimeSeriesTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker color for scatter points.
const SCATTER_COLOR: &str = "rgba(50, 100, 200, 0.6)";

/// Trendline color.
const TREND_COLOR: &str = "red";

/// Errors that can occur while building a chart specification.
#[derive(Debug, Error)]
pub enum ChartError {
    /// A chart must carry a visible title
    #[error("chart title must not be empty")]
    EmptyTitle,

    /// Every axis must carry a visible label
    #[error("{axis}-axis label must not be empty")]
    EmptyAxisLabel {
        /// Which axis was left unlabeled
        axis: char,
    },

    /// Series error
    #[error("Series error: {0}")]
    Series(#[from] haze::SeriesError),
}

/// Kind of chart being described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Time-series line chart
    Line,
    /// Correlation scatter plot
    Scatter,
}

/// Hover behavior requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverMode {
    /// One unified tooltip per x position (time-series charts)
    XUnified,
    /// Tooltip for the nearest point (scatter plots)
    Closest,
}

/// How a trace's points are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    /// Connected line
    Lines,
    /// Individual markers
    Markers,
}

/// Axis description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Axis label; never empty
    pub label: String,
    /// Whether grid lines are drawn
    pub show_grid: bool,
}

/// A single x position: a calendar date for line charts, a numeric value for
/// scatter plots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    /// Calendar date
    Date(NaiveDate),
    /// Numeric value
    Number(f64),
}

/// One chart point. A null y renders as a gap, so a trace built from a table
/// keeps one point per input row even when some observations are missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Position along the x axis
    pub x: PointValue,
    /// Position along the y axis; `None` is a gap
    pub y: Option<f64>,
}

/// One drawable series within a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Legend name
    pub name: String,
    /// Drawing mode
    pub mode: TraceMode,
    /// Line or marker color
    pub color: String,
    /// Whether the line is dashed
    pub dashed: bool,
    /// Renderer hover template for this trace
    pub hover_template: String,
    /// The points, in input order
    pub points: Vec<ChartPoint>,
}

/// A complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart title; never empty
    pub title: String,
    /// What kind of chart this is
    pub kind: ChartKind,
    /// Horizontal axis
    pub x_axis: AxisSpec,
    /// Vertical axis
    pub y_axis: AxisSpec,
    /// Hover interaction, always enabled
    pub hover: HoverMode,
    /// Drawable series, primary trace first
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    /// Number of points in the primary trace.
    pub fn point_count(&self) -> usize {
        self.traces.first().map_or(0, |trace| trace.points.len())
    }
}

fn validate(title: &str, x_label: &str, y_label: &str) -> Result<(), ChartError> {
    if title.trim().is_empty() {
        return Err(ChartError::EmptyTitle);
    }
    if x_label.trim().is_empty() {
        return Err(ChartError::EmptyAxisLabel { axis: 'x' });
    }
    if y_label.trim().is_empty() {
        return Err(ChartError::EmptyAxisLabel { axis: 'y' });
    }
    Ok(())
}

/// Build a line chart over a single series.
///
/// One point per table row; missing observations become gaps rather than
/// dropped points.
pub fn time_series_chart(
    table: &TimeSeriesTable,
    title: &str,
    y_label: &str,
    color: &str,
) -> Result<ChartSpec, ChartError> {
    validate(title, "Date", y_label)?;

    let points = table
        .dates()?
        .into_iter()
        .zip(table.values()?)
        .map(|(date, value)| ChartPoint {
            x: PointValue::Date(date),
            y: value,
        })
        .collect();

    Ok(ChartSpec {
        title: title.to_string(),
        kind: ChartKind::Line,
        x_axis: AxisSpec {
            label: "Date".to_string(),
            show_grid: true,
        },
        y_axis: AxisSpec {
            label: y_label.to_string(),
            show_grid: true,
        },
        hover: HoverMode::XUnified,
        traces: vec![Trace {
            name: y_label.to_string(),
            mode: TraceMode::Lines,
            color: color.to_string(),
            dashed: false,
            hover_template: format!(
                "<b>Date</b>: %{{x|%Y-%m-%d}}<br><b>{y_label}</b>: %{{y:.2f}}"
            ),
            points,
        }],
    })
}

/// Build a correlation scatter plot over an aligned pair.
///
/// Left values map to x, right values to y. Rows whose x observation is
/// missing cannot be placed and are skipped. With `trendline`, a dashed
/// least-squares fit is added as a second trace; it is omitted when fewer
/// than two complete pairs exist or either side has zero variance, since no
/// line is defined there.
pub fn scatter_chart(
    pair: &AlignedPair,
    title: &str,
    x_label: &str,
    y_label: &str,
    trendline: bool,
) -> Result<ChartSpec, ChartError> {
    validate(title, x_label, y_label)?;

    let left = pair.left().values()?;
    let right = pair.right().values()?;

    let points: Vec<ChartPoint> = left
        .iter()
        .zip(&right)
        .filter_map(|(x, y)| {
            x.map(|x| ChartPoint {
                x: PointValue::Number(x),
                y: *y,
            })
        })
        .collect();

    let mut traces = vec![Trace {
        name: "Data Points".to_string(),
        mode: TraceMode::Markers,
        color: SCATTER_COLOR.to_string(),
        dashed: false,
        hover_template: format!(
            "<b>{x_label}</b>: %{{x:.2f}}<br><b>{y_label}</b>: %{{y:.2f}}"
        ),
        points,
    }];

    if trendline {
        let (xs, ys): (Vec<f64>, Vec<f64>) = left
            .into_iter()
            .zip(right)
            .filter_map(|observations| match observations {
                (Some(x), Some(y)) => Some((x, y)),
                _ => None,
            })
            .unzip();

        if let Some(trace) = trend_trace(&xs, &ys) {
            traces.push(trace);
        }
    }

    Ok(ChartSpec {
        title: title.to_string(),
        kind: ChartKind::Scatter,
        x_axis: AxisSpec {
            label: x_label.to_string(),
            show_grid: true,
        },
        y_axis: AxisSpec {
            label: y_label.to_string(),
            show_grid: true,
        },
        hover: HoverMode::Closest,
        traces,
    })
}

/// Least-squares line over the complete pairs, as a two-point trace.
fn trend_trace(xs: &[f64], ys: &[f64]) -> Option<Trace> {
    let (slope, intercept) = linear_fit(xs, ys)?;

    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(Trace {
        name: "Trend Line".to_string(),
        mode: TraceMode::Lines,
        color: TREND_COLOR.to_string(),
        dashed: true,
        hover_template: "<b>Trend Line</b>".to_string(),
        points: vec![
            ChartPoint {
                x: PointValue::Number(min_x),
                y: Some(slope * min_x + intercept),
            },
            ChartPoint {
                x: PointValue::Number(max_x),
                y: Some(slope * max_x + intercept),
            },
        ],
    })
}

fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x) * (x - mean_x);
        var_y += (y - mean_y) * (y - mean_y);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let slope = covariance / var_x;
    Some((slope, mean_y - slope * mean_x))
}
