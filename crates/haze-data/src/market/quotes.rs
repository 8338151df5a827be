//! Index quote fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use haze::TimeSeriesTable;
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

/// Yahoo Finance ticker for the Nifty 50 index, the dashboard default.
pub const NIFTY_50: &str = "^NSEI";

/// Name of the series produced by the market-index loader.
pub const CLOSE_SERIES: &str = "close";

/// Yahoo Finance index provider with rate limiting.
pub struct IndexQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: StdDuration,
}

impl std::fmt::Debug for IndexQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl IndexQuoteProvider {
    /// Create a provider with default rate limiting (1 req/sec).
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(StdDuration::from_millis(1000))
    }

    /// Create a provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: StdDuration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch daily closing values for `symbol` covering `days` back from now.
    ///
    /// Weekends and market holidays are absent rows in the result, not
    /// missing values; the Aligner deals with them.
    pub async fn fetch_daily_close(&self, symbol: &str, days: u32) -> Result<TimeSeriesTable> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }
        if days == 0 {
            return Err(DataError::InvalidWindow { days });
        }

        let end = Utc::now();
        let start = end - Duration::days(i64::from(days));

        // Convert chrono DateTime to time::OffsetDateTime
        let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                series: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let mut rows: Vec<(NaiveDate, Option<f64>)> = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            let stamp = DateTime::<Utc>::from_timestamp(quote.timestamp, 0).ok_or_else(|| {
                DataError::TimeConversion(format!("timestamp {} out of range", quote.timestamp))
            })?;
            rows.push((stamp.date_naive(), Some(quote.close)));
        }
        // An open session can duplicate the last settled date; keep the settled row.
        rows.dedup_by_key(|(date, _)| *date);

        let table = TimeSeriesTable::from_pairs(CLOSE_SERIES, rows)?;

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        Ok(table)
    }
}
