//! Open-Meteo air-quality client with retry and backoff.

use crate::error::{DataError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use haze::TimeSeriesTable;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration as StdDuration;
use tokio::time::sleep;

/// Open-Meteo air-quality API base URL
const AIR_QUALITY_BASE_URL: &str = "https://air-quality-api.open-meteo.com";

/// Hourly timestamp format used by Open-Meteo (e.g. `2024-03-01T13:00`)
const HOURLY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Retries before a transient failure is surfaced
const DEFAULT_MAX_RETRIES: u32 = 5;

/// Base delay for exponential backoff between retries
const BACKOFF_BASE: StdDuration = StdDuration::from_millis(200);

/// Name of the series produced by the air-quality loader.
pub const AQI_SERIES: &str = "aqi";

/// Geographic point a pollution series is requested for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// Mumbai, the dashboard's default location.
pub const MUMBAI: Location = Location {
    latitude: 19.0760,
    longitude: 72.8777,
};

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    hourly: HourlyBlock,
}

/// Parallel arrays, one entry per hour in the requested window.
#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    pm10: Vec<Option<f64>>,
}

/// Open-Meteo air-quality client.
///
/// PM10 stands in for the AQI, as in the upstream dashboard; the official
/// index formula is out of scope.
#[derive(Debug)]
pub struct AirQualityClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl AirQualityClient {
    /// Create a client against the public Open-Meteo endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(AIR_QUALITY_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Fetch a daily PM10 series covering `days` back from today.
    ///
    /// Hourly readings are averaged per calendar day. A day whose readings
    /// are all null stays in the table as a missing value; the gap filler
    /// decides what to do with it.
    pub async fn fetch_daily_aqi(&self, location: Location, days: u32) -> Result<TimeSeriesTable> {
        if days == 0 {
            return Err(DataError::InvalidWindow { days });
        }

        let end = Utc::now().date_naive();
        let start = end - Duration::days(i64::from(days));
        let response = self.request_hourly(location, start, end).await?;

        let rows = daily_mean(&response.hourly.time, &response.hourly.pm10)?;
        if rows.is_empty() {
            return Err(DataError::MissingData {
                series: AQI_SERIES.to_string(),
                reason: "no hourly readings returned by Open-Meteo".to_string(),
            });
        }

        Ok(TimeSeriesTable::from_pairs(AQI_SERIES, rows)?)
    }

    async fn request_hourly(
        &self,
        location: Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AirQualityResponse> {
        let url = format!("{}/v1/air-quality", self.base_url);
        let params = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("hourly", "pm10".to_string()),
            ("timezone", "UTC".to_string()),
        ];

        let mut attempt = 0;
        loop {
            let backoff = BACKOFF_BASE * 2u32.pow(attempt);
            match self.client.get(&url).query(&params).send().await {
                Ok(response) if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if attempt >= self.max_retries {
                        return Err(DataError::RateLimit {
                            retry_after_ms: backoff.as_millis() as u64,
                        });
                    }
                    sleep(backoff).await;
                }
                Ok(response) => {
                    let response = response.error_for_status()?;
                    return Ok(response.json::<AirQualityResponse>().await?);
                }
                Err(err)
                    if attempt < self.max_retries && (err.is_timeout() || err.is_connect()) =>
                {
                    sleep(backoff).await;
                }
                Err(err) => return Err(DataError::Network(err)),
            }
            attempt += 1;
        }
    }
}

/// Average hourly readings into one row per calendar day.
fn daily_mean(
    times: &[String],
    readings: &[Option<f64>],
) -> Result<Vec<(NaiveDate, Option<f64>)>> {
    if times.len() != readings.len() {
        return Err(DataError::Parse(format!(
            "hourly arrays disagree in length: {} times vs {} readings",
            times.len(),
            readings.len()
        )));
    }

    let mut buckets: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for (stamp, reading) in times.iter().zip(readings) {
        let parsed = NaiveDateTime::parse_from_str(stamp, HOURLY_TIME_FORMAT)
            .map_err(|e| DataError::Parse(format!("bad hourly timestamp '{stamp}': {e}")))?;
        let bucket = buckets.entry(parsed.date()).or_insert((0.0, 0));
        if let Some(value) = reading {
            bucket.0 += value;
            bucket.1 += 1;
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(date, (sum, count))| {
            let mean = (count > 0).then(|| sum / f64::from(count));
            (date, mean)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[tokio::test]
    async fn test_zero_day_window_is_rejected() {
        let client = AirQualityClient::new().unwrap();
        let result = client.fetch_daily_aqi(MUMBAI, 0).await;
        assert!(matches!(result, Err(DataError::InvalidWindow { days: 0 })));
    }

    #[test]
    fn test_daily_mean_groups_by_calendar_day() {
        let times = vec![
            "2024-03-01T00:00".to_string(),
            "2024-03-01T01:00".to_string(),
            "2024-03-02T00:00".to_string(),
        ];
        let readings = vec![Some(10.0), Some(30.0), Some(50.0)];

        let rows = daily_mean(&times, &readings).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_abs_diff_eq!(rows[0].1.unwrap(), 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rows[1].1.unwrap(), 50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_daily_mean_keeps_all_null_days_as_missing() {
        let times = vec![
            "2024-03-01T00:00".to_string(),
            "2024-03-01T01:00".to_string(),
        ];
        let readings = vec![None, None];

        let rows = daily_mean(&times, &readings).unwrap();
        assert_eq!(rows, vec![(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), None)]);
    }

    #[test]
    fn test_daily_mean_ignores_null_hours_within_a_day() {
        let times = vec![
            "2024-03-01T00:00".to_string(),
            "2024-03-01T01:00".to_string(),
            "2024-03-01T02:00".to_string(),
        ];
        let readings = vec![Some(10.0), None, Some(20.0)];

        let rows = daily_mean(&times, &readings).unwrap();
        assert_abs_diff_eq!(rows[0].1.unwrap(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_daily_mean_rejects_mismatched_arrays() {
        let times = vec!["2024-03-01T00:00".to_string()];
        let result = daily_mean(&times, &[]);
        assert!(matches!(result, Err(DataError::Parse(_))));
    }

    #[test]
    fn test_daily_mean_rejects_bad_timestamp() {
        let times = vec!["not-a-timestamp".to_string()];
        let result = daily_mean(&times, &[Some(1.0)]);
        assert!(matches!(result, Err(DataError::Parse(_))));
    }
}
