//! Weather summary returned by the historical weather tool

use super::DailyWeather;
use crate::dates::NormalizedRange;
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Historical weather for a resolved location and date range
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastSummary {
    /// Display label, e.g. `"Chamonix, France"`
    pub location: String,
    pub coordinates: Coordinates,
    /// Name the geocoder matched
    pub resolved_query: Option<String>,
    /// Location string exactly as requested
    pub original_query: String,
    /// Always `"historical"`
    pub data_type: String,
    /// Requested and resolved (clamped) ranges
    pub date_range: NormalizedRange,
    /// One record per archive date, in archive order
    pub forecast: Vec<DailyWeather>,
}

impl ForecastSummary {
    pub const DATA_TYPE: &'static str = "historical";

    /// Render as the pretty JSON handed to the agent
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
