//! Dashboard data loading with read-through caching, plus artifact output.
//!
//! The two provider fetches have no ordering dependency and run concurrently;
//! everything downstream of them is sequential. A cache failure is never
//! fatal: a broken cache degrades to a plain fetch, and a failed cache write
//! is a warning.

use super::cache_manager;
use haze::TimeSeriesTable;
use haze_data::cache::ProviderKind;
use haze_data::market::IndexQuoteProvider;
use haze_data::meteo::{AirQualityClient, Location};
use haze_output::chart::ChartSpec;
use std::path::{Path, PathBuf};

/// Error type for dashboard operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DashboardError {
    /// Data fetch error from a provider.
    #[error("Data fetch error: {0}")]
    Fetch(#[from] haze_data::DataError),
    /// Chart serialization error.
    #[error("Chart serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// IO error while writing artifacts.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for data fetching.
#[derive(Debug, Clone)]
pub(crate) struct FetchConfig {
    /// Whether to use the cache.
    pub use_cache: bool,
    /// Whether to force refresh (ignore cache).
    pub force_refresh: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
        }
    }
}

/// Cache key for an air-quality location.
fn location_key(location: Location) -> String {
    format!("{:.4},{:.4}", location.latitude, location.longitude)
}

/// Load the air-quality series, checking the cache first.
pub(crate) async fn load_air_quality(
    client: &AirQualityClient,
    location: Location,
    days: u32,
    config: &FetchConfig,
) -> Result<TimeSeriesTable, DashboardError> {
    let key = location_key(location);

    if config.use_cache
        && !config.force_refresh
        && let Ok(cache) = cache_manager::open_cache()
        && cache
            .has_series(ProviderKind::AirQuality, &key, days)
            .unwrap_or(false)
        && let Ok(table) = cache.get_series(ProviderKind::AirQuality, &key, days)
    {
        return Ok(table);
    }

    let table = client.fetch_daily_aqi(location, days).await?;

    if config.use_cache
        && let Ok(cache) = cache_manager::open_cache()
        && let Err(e) = cache.put_series(ProviderKind::AirQuality, &key, days, &table)
    {
        eprintln!("Warning: Failed to cache air-quality series: {}", e);
    }

    Ok(table)
}

/// Load the market-index series, checking the cache first.
pub(crate) async fn load_market_index(
    provider: &IndexQuoteProvider,
    ticker: &str,
    days: u32,
    config: &FetchConfig,
) -> Result<TimeSeriesTable, DashboardError> {
    if config.use_cache
        && !config.force_refresh
        && let Ok(cache) = cache_manager::open_cache()
        && cache
            .has_series(ProviderKind::MarketIndex, ticker, days)
            .unwrap_or(false)
        && let Ok(table) = cache.get_series(ProviderKind::MarketIndex, ticker, days)
    {
        return Ok(table);
    }

    let table = provider.fetch_daily_close(ticker, days).await?;

    if config.use_cache
        && let Ok(cache) = cache_manager::open_cache()
        && let Err(e) = cache.put_series(ProviderKind::MarketIndex, ticker, days, &table)
    {
        eprintln!("Warning: Failed to cache index series for {}: {}", ticker, e);
    }

    Ok(table)
}

/// Write a chart specification as a JSON artifact.
pub(crate) fn write_chart(
    dir: &Path,
    file_name: &str,
    chart: &ChartSpec,
) -> Result<PathBuf, DashboardError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, serde_json::to_string_pretty(chart)?)?;
    Ok(path)
}
