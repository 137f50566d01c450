use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use roro_models::config::{FredConfig, FredSeries};

use crate::error::DataError;

/// The most recent numeric observation of a macroeconomic series.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroReading {
    pub series_id: String,
    pub label: String,
    pub value: f64,
    pub observed_on: NaiveDate,
}

/// Macroeconomic data access for the desk. Mockable for testing.
#[async_trait]
pub trait MacroData: Send + Sync {
    async fn latest(&self, series: &FredSeries) -> Result<MacroReading, DataError>;
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: NaiveDate,
    value: String,
}

/// Client for the FRED observations API. This system reads only the most
/// recent value of each configured series.
pub struct FredClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FredClient {
    pub fn from_config(config: &FredConfig) -> Result<Self, DataError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("FRED_API_KEY").ok())
            .ok_or_else(|| {
                DataError::Config(
                    "FRED API key missing: set fred.api_key or the FRED_API_KEY environment \
                     variable"
                        .to_string(),
                )
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl MacroData for FredClient {
    async fn latest(&self, series: &FredSeries) -> Result<MacroReading, DataError> {
        debug!(series = %series.id, "Fetching FRED observations");

        let url = format!("{}/series/observations", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("series_id", series.id.as_str()),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "10"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ObservationsResponse = response.json().await?;
        latest_reading(series, body)
    }
}

/// Pick the most recent observation with a numeric value. FRED marks
/// missing data points with "."; those are skipped.
fn latest_reading(
    series: &FredSeries,
    body: ObservationsResponse,
) -> Result<MacroReading, DataError> {
    body.observations
        .into_iter()
        .find_map(|obs| {
            obs.value.parse::<f64>().ok().map(|value| MacroReading {
                series_id: series.id.clone(),
                label: series.label.clone(),
                value,
                observed_on: obs.date,
            })
        })
        .ok_or_else(|| DataError::MissingValue(series.id.clone()))
}
