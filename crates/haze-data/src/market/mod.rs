//! Market-index data from Yahoo Finance.

pub mod quotes;

pub use quotes::{CLOSE_SERIES, IndexQuoteProvider, NIFTY_50};
