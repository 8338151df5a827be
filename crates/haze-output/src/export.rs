//! Export of aligned analysis data.

use chrono::NaiveDate;
use haze::AlignedPair;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Series error.
    #[error("Series error: {0}")]
    Series(#[from] haze::SeriesError),

    /// Produced bytes were not valid text.
    #[error("Invalid output: {0}")]
    InvalidOutput(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One aligned observation row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    /// Common date.
    pub date: NaiveDate,

    /// Left series observation, if present.
    pub left: Option<f64>,

    /// Right series observation, if present.
    pub right: Option<f64>,
}

/// Analysis payload written by the dashboard: the aligned rows plus the
/// correlation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisExport {
    /// Left series name (CSV column header).
    pub left_name: String,

    /// Right series name (CSV column header).
    pub right_name: String,

    /// Window length the data was fetched for, in days.
    pub window_days: u32,

    /// Pearson coefficient, absent when undefined.
    pub correlation: Option<f64>,

    /// Aligned observations in date order.
    pub rows: Vec<AlignedRow>,
}

impl AnalysisExport {
    /// Assemble the payload from an aligned pair.
    pub fn from_pair(
        pair: &AlignedPair,
        window_days: u32,
        correlation: Option<f64>,
    ) -> Result<Self, ExportError> {
        let dates = pair.dates()?;
        let left = pair.left().values()?;
        let right = pair.right().values()?;

        let rows = dates
            .into_iter()
            .zip(left.into_iter().zip(right))
            .map(|(date, (left, right))| AlignedRow { date, left, right })
            .collect();

        Ok(Self {
            left_name: pair.left().name().to_string(),
            right_name: pair.right().name().to_string(),
            window_days,
            correlation,
            rows,
        })
    }
}

/// Serialize analysis data into a chosen format.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for AnalysisExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                // Column headers carry the series names, so the record rows
                // are written by hand rather than serde-derived.
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["date", self.left_name.as_str(), self.right_name.as_str()])?;
                for row in &self.rows {
                    wtr.write_record([
                        row.date.to_string(),
                        row.left.map(|v| v.to_string()).unwrap_or_default(),
                        row.right.map(|v| v.to_string()).unwrap_or_default(),
                    ])?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes).map_err(|e| ExportError::InvalidOutput(e.to_string()))
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haze::{TimeSeriesTable, align};

    fn pair() -> AlignedPair {
        let a = TimeSeriesTable::from_pairs(
            "aqi",
            vec![
                (NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), Some(50.0)),
                (NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), None),
            ],
        )
        .unwrap();
        let b = TimeSeriesTable::from_pairs(
            "close",
            vec![
                (NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), Some(22_100.0)),
                (NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), Some(22_250.5)),
            ],
        )
        .unwrap();
        align(&a, &b).unwrap()
    }

    #[test]
    fn test_csv_export_uses_series_names_as_headers() {
        let export = AnalysisExport::from_pair(&pair(), 365, Some(0.42)).unwrap();
        let csv = export.export_to_string(ExportFormat::Csv).unwrap();

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("date,aqi,close"));
        assert_eq!(lines.next(), Some("2024-03-01,50,22100"));
        // A missing observation is an empty field, not a sentinel value.
        assert_eq!(lines.next(), Some("2024-03-02,,22250.5"));
    }

    #[test]
    fn test_json_export_carries_correlation() {
        let export = AnalysisExport::from_pair(&pair(), 365, Some(0.42)).unwrap();
        let json = export.export_to_string(ExportFormat::Json).unwrap();

        assert!(json.contains("\"correlation\":0.42"));
        assert!(json.contains("\"window_days\":365"));
    }

    #[test]
    fn test_undefined_correlation_is_null_in_json() {
        let export = AnalysisExport::from_pair(&pair(), 30, None).unwrap();
        let json = export.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"correlation\":null"));
    }

    #[test]
    fn test_pretty_json_is_indented() {
        let export = AnalysisExport::from_pair(&pair(), 30, None).unwrap();
        let json = export.export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("  "));
    }

    #[test]
    fn test_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
