//! SQLite read-through cache for loaded series.
//!
//! Entries are keyed by (provider, series key, window, as-of-hour) so a
//! lookup only ever matches data fetched within the current hour; anything
//! older is purged on access. Subsequent renders therefore observe fresh
//! provider data at most one hour after it changed.

use crate::error::{DataError, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use haze::TimeSeriesTable;
use rusqlite::{Connection, params};
use std::path::Path;

/// How long a cached series stays valid, in seconds.
pub const CACHE_TTL_SECS: i64 = 3600;

/// Which provider a cached series came from; part of every cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Open-Meteo air quality
    AirQuality,
    /// Yahoo Finance market index
    MarketIndex,
}

impl ProviderKind {
    /// Convert to database string representation.
    pub const fn to_db_str(&self) -> &'static str {
        match self {
            Self::AirQuality => "air_quality",
            Self::MarketIndex => "market_index",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "air_quality" => Ok(Self::AirQuality),
            "market_index" => Ok(Self::MarketIndex),
            _ => Err(DataError::Parse(format!("Invalid provider kind: {}", s))),
        }
    }

    /// Name given to series rebuilt from this provider's cache entries.
    pub const fn series_name(&self) -> &'static str {
        match self {
            Self::AirQuality => "aqi",
            Self::MarketIndex => "close",
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached rows across all series
    pub rows: i64,
    /// Distinct (provider, key, window, hour) series entries
    pub series: i64,
}

/// SQLite cache for loaded series.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS series (
                provider TEXT NOT NULL,
                series_key TEXT NOT NULL,
                window_days INTEGER NOT NULL,
                as_of_hour TEXT NOT NULL,
                date TEXT NOT NULL,
                value REAL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (provider, series_key, window_days, as_of_hour, date)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_series_cached_at ON series(cached_at)",
            [],
        )?;

        Ok(())
    }

    /// Store a loaded series under the current as-of-hour.
    pub fn put_series(
        &self,
        provider: ProviderKind,
        series_key: &str,
        window_days: u32,
        table: &TimeSeriesTable,
    ) -> Result<()> {
        let now = Utc::now();
        let cached_at = now.to_rfc3339();
        let hour = as_of_hour(now);

        let dates = table.dates()?;
        let values = table.values()?;

        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM series
             WHERE provider = ?1 AND series_key = ?2 AND window_days = ?3 AND as_of_hour = ?4",
            params![provider.to_db_str(), series_key, window_days, hour],
        )?;

        for (date, value) in dates.iter().zip(&values) {
            tx.execute(
                "INSERT INTO series
                 (provider, series_key, window_days, as_of_hour, date, value, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    provider.to_db_str(),
                    series_key,
                    window_days,
                    hour,
                    date.to_string(),
                    value,
                    cached_at
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Whether a fresh entry exists for this key.
    pub fn has_series(
        &self,
        provider: ProviderKind,
        series_key: &str,
        window_days: u32,
    ) -> Result<bool> {
        self.purge_expired()?;

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM series
             WHERE provider = ?1 AND series_key = ?2 AND window_days = ?3 AND as_of_hour = ?4",
            params![
                provider.to_db_str(),
                series_key,
                window_days,
                as_of_hour(Utc::now())
            ],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Rebuild a cached series.
    ///
    /// Only matches entries stored within the current as-of-hour; a stale or
    /// absent entry is `MissingData`, which callers treat as a cache miss.
    pub fn get_series(
        &self,
        provider: ProviderKind,
        series_key: &str,
        window_days: u32,
    ) -> Result<TimeSeriesTable> {
        self.purge_expired()?;

        let mut stmt = self.conn.prepare(
            "SELECT date, value FROM series
             WHERE provider = ?1 AND series_key = ?2 AND window_days = ?3 AND as_of_hour = ?4
             ORDER BY date ASC",
        )?;

        let rows = stmt.query_map(
            params![
                provider.to_db_str(),
                series_key,
                window_days,
                as_of_hour(Utc::now())
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?)),
        )?;

        let mut pairs: Vec<(NaiveDate, Option<f64>)> = Vec::new();
        for row in rows {
            let (date, value) = row?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| DataError::Parse(format!("bad cached date '{date}': {e}")))?;
            pairs.push((date, value));
        }

        if pairs.is_empty() {
            return Err(DataError::MissingData {
                series: provider.series_name().to_string(),
                reason: "No cached data found".to_string(),
            });
        }

        Ok(TimeSeriesTable::from_pairs(provider.series_name(), pairs)?)
    }

    /// Delete entries older than the TTL. Returns the number of rows removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let cutoff = (Utc::now() - Duration::seconds(CACHE_TTL_SECS)).to_rfc3339();
        let removed = self
            .conn
            .execute("DELETE FROM series WHERE cached_at < ?1", params![cutoff])?;
        Ok(removed)
    }

    /// Drop every cached entry.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM series", [])?;
        Ok(())
    }

    /// Current cache contents.
    pub fn stats(&self) -> Result<CacheStats> {
        let (rows, series) = self.conn.query_row(
            "SELECT COUNT(*),
                    COUNT(DISTINCT provider || ':' || series_key || ':' || window_days || ':' || as_of_hour)
             FROM series",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(CacheStats { rows, series })
    }
}

fn as_of_hour(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H").to_string()
}
