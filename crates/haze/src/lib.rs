#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/markethaze/haze/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod align;
pub mod correlate;
pub mod error;
pub mod fill;
pub mod table;

pub use align::{AlignedPair, align};
pub use correlate::{CorrelationError, correlate, pearson};
pub use error::{Result, SeriesError};
pub use fill::{GapFillStrategy, fill};
pub use table::TimeSeriesTable;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
