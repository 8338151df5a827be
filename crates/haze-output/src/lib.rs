#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/markethaze/haze/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chart;
pub mod export;
pub mod summary;

pub use chart::{
    AxisSpec, ChartError, ChartKind, ChartPoint, ChartSpec, HoverMode, PointValue, Trace,
    TraceMode, scatter_chart, time_series_chart,
};
pub use export::{AlignedRow, AnalysisExport, ExportError, ExportFormat, Exporter};
pub use summary::{AnalysisSummary, CorrelationStrength};
