//! Geocoding match returned by the Open-Meteo search endpoint

use serde::{Deserialize, Serialize};

/// First match for a successfully geocoded candidate
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Place name as known to the geocoder
    #[serde(default)]
    pub name: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Country name
    #[serde(default)]
    pub country: Option<String>,
    /// Country code (ISO 3166-1 alpha-2)
    #[serde(default)]
    pub country_code: Option<String>,
}

impl GeocodeResult {
    /// Create a match with a name and country
    #[must_use]
    pub fn new(name: &str, country: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            latitude,
            longitude,
            country: Some(country.to_string()),
            country_code: None,
        }
    }

    /// Display label `"{name}, {country}"`.
    ///
    /// The name falls back to the raw query, the country to the country code.
    /// Leading and trailing commas and spaces are trimmed, so a match without
    /// any country renders as the bare name.
    #[must_use]
    pub fn label(&self, raw_query: &str) -> String {
        let name = self.name.as_deref().unwrap_or(raw_query);
        let country = self
            .country
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.country_code.as_deref())
            .unwrap_or("");
        format!("{name}, {country}")
            .trim_matches(|c| c == ',' || c == ' ')
            .to_string()
    }
}
