//! Historical weather lookup against the Open-Meteo geocoding and archive APIs
//!
//! The flow is: validate the date range, resolve the location through its
//! candidates, query the archive for the resolved range and map the daily
//! columns into per-day records.

use crate::config::EndpointsConfig;
use crate::dates::{self, DateRange, NormalizedRange};
use crate::error::ToolError;
use crate::http::HttpFetcher;
use crate::location_resolver::{Geocoder, LocationResolver, ResolutionFailure};
use crate::models::{Coordinates, DailyWeather, ForecastSummary, GeocodeResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

pub use openmeteo::{ArchiveDaily, ArchiveResponse};

/// Daily metrics requested from the archive
pub const DAILY_METRICS: [&str; 8] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "temperature_2m_mean",
    "precipitation_sum",
    "precipitation_hours",
    "weathercode",
    "windspeed_10m_max",
    "windgusts_10m_max",
];

/// Source of daily archive data
#[async_trait]
pub trait WeatherArchive: Send + Sync {
    async fn daily(
        &self,
        latitude: f64,
        longitude: f64,
        range: DateRange,
    ) -> anyhow::Result<ArchiveResponse>;
}

/// Open-Meteo geocoding + archive client
pub struct OpenMeteoClient {
    fetcher: HttpFetcher,
    geocoding_url: String,
    archive_url: String,
}

impl OpenMeteoClient {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, endpoints: &EndpointsConfig) -> Self {
        Self {
            fetcher,
            geocoding_url: endpoints.geocoding_url.clone(),
            archive_url: endpoints.archive_url.clone(),
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn geocode(&self, name: &str) -> anyhow::Result<Vec<GeocodeResult>> {
        let response: openmeteo::GeocodingResponse = self
            .fetcher
            .get_json(&self.geocoding_url, &[("name", name), ("count", "5")])
            .await?;
        Ok(response.results.unwrap_or_default())
    }
}

#[async_trait]
impl WeatherArchive for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn daily(
        &self,
        latitude: f64,
        longitude: f64,
        range: DateRange,
    ) -> anyhow::Result<ArchiveResponse> {
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("start_date", range.start.to_string()),
            ("end_date", range.end.to_string()),
            ("daily", DAILY_METRICS.join(",")),
            ("timezone", "auto".to_string()),
        ];
        Ok(self.fetcher.get_json(&self.archive_url, &query).await?)
    }
}

/// Historical weather for `location` between `start` and `end` (inclusive).
pub async fn historical_weather(
    geocoder: &dyn Geocoder,
    archive: &dyn WeatherArchive,
    location: &str,
    start: &str,
    end: &str,
    today: NaiveDate,
) -> Result<ForecastSummary, ToolError> {
    let range = dates::normalize(start, end, today)?;

    let resolved = LocationResolver::resolve(geocoder, location)
        .await
        .map_err(|failure| match failure {
            ResolutionFailure::Api(error) => ToolError::Geocoding(error),
            ResolutionFailure::NotFound => ToolError::LocationNotFound(location.to_string()),
        })?;
    let geo = resolved.result;

    info!(
        "Fetching archive weather for {} ({:.4}, {:.4}) from {} to {}",
        geo.label(location),
        geo.latitude,
        geo.longitude,
        range.resolved.start,
        range.resolved.end
    );

    let response = archive
        .daily(geo.latitude, geo.longitude, range.resolved)
        .await
        .map_err(|e| ToolError::Weather(format!("{e:#}")))?;

    summarize(&geo, location, range, &response)
}

/// Map an archive response into a summary; fails if it holds no dates.
pub fn summarize(
    geo: &GeocodeResult,
    original_query: &str,
    date_range: NormalizedRange,
    response: &ArchiveResponse,
) -> Result<ForecastSummary, ToolError> {
    let daily = response
        .daily
        .as_ref()
        .filter(|daily| !daily.time.is_empty())
        .ok_or(ToolError::NoWeatherData)?;

    let forecast: Vec<DailyWeather> = (0..daily.time.len()).map(|i| daily.day(i)).collect();
    debug!("Built {} daily records", forecast.len());

    Ok(ForecastSummary {
        location: geo.label(original_query),
        coordinates: Coordinates {
            lat: geo.latitude,
            lon: geo.longitude,
        },
        resolved_query: geo.name.clone(),
        original_query: original_query.to_string(),
        data_type: ForecastSummary::DATA_TYPE.to_string(),
        date_range,
        forecast,
    })
}

/// `OpenMeteo` API response structures
pub mod openmeteo {
    use crate::models::{DailyWeather, GeocodeResult};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::HashMap;

    /// Geocoding response from `OpenMeteo`; `results` is absent when nothing matched
    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodeResult>>,
    }

    /// Archive response; only the daily block is used
    #[derive(Debug, Default, Deserialize)]
    pub struct ArchiveResponse {
        pub daily: Option<ArchiveDaily>,
    }

    /// Column-oriented daily data: one array per metric, aligned with `time`
    #[derive(Debug, Default, Deserialize)]
    pub struct ArchiveDaily {
        #[serde(default, deserialize_with = "null_as_empty")]
        pub time: Vec<String>,
        #[serde(flatten)]
        pub metrics: HashMap<String, Value>,
    }

    fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
    }

    impl ArchiveDaily {
        /// Cell `index` of metric `key`; `None` for a missing key, a short
        /// column or a `null` cell
        #[must_use]
        pub fn value(&self, key: &str, index: usize) -> Option<&Value> {
            self.metrics
                .get(key)
                .and_then(Value::as_array)
                .and_then(|column| column.get(index))
                .filter(|cell| !cell.is_null())
        }

        /// First present cell among alias keys
        #[must_use]
        pub fn value_any(&self, keys: &[&str], index: usize) -> Option<&Value> {
            keys.iter().find_map(|key| self.value(key, index))
        }

        fn number(&self, key: &str, index: usize) -> Option<f64> {
            self.value(key, index).and_then(Value::as_f64)
        }

        /// Record for day `index`
        #[must_use]
        pub fn day(&self, index: usize) -> DailyWeather {
            DailyWeather {
                date: self.time.get(index).cloned().unwrap_or_default(),
                temp_max: self.number("temperature_2m_max", index),
                temp_min: self.number("temperature_2m_min", index),
                temp_mean: self.number("temperature_2m_mean", index),
                precipitation_sum: self.number("precipitation_sum", index),
                precipitation_hours: self.number("precipitation_hours", index),
                precipitation_probability: self
                    .value_any(
                        &["precipitation_probability_mean", "precipitation_probability_max"],
                        index,
                    )
                    .and_then(Value::as_f64),
                weather_code: self
                    .value_any(&["weathercode", "weather_code"], index)
                    .and_then(|code| code.as_i64().or_else(|| code.as_f64().map(|c| c as i64))),
                wind_speed_max: self.number("windspeed_10m_max", index),
                wind_gusts_max: self.number("windgusts_10m_max", index),
            }
        }
    }
}
