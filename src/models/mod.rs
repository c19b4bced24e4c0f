//! Data models for the scout agents
//!
//! - Location: geocoding matches and their display labels
//! - Weather: per-day historical weather records
//! - Forecast: the summary returned by the weather tool

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{Coordinates, ForecastSummary};
pub use location::GeocodeResult;
pub use weather::DailyWeather;
