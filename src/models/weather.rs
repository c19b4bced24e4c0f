//! Per-day historical weather record

use serde::{Deserialize, Serialize};

/// One day of archive data.
///
/// Every metric is optional: a value missing upstream stays `None` and is
/// serialized as `null`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DailyWeather {
    /// Date as reported by the archive (`YYYY-MM-DD`)
    pub date: String,
    /// Maximum air temperature at 2 m in Celsius
    pub temp_max: Option<f64>,
    /// Minimum air temperature at 2 m in Celsius
    pub temp_min: Option<f64>,
    /// Mean air temperature at 2 m in Celsius
    pub temp_mean: Option<f64>,
    /// Total precipitation in mm
    pub precipitation_sum: Option<f64>,
    /// Hours with precipitation
    pub precipitation_hours: Option<f64>,
    /// Precipitation probability in percent
    pub precipitation_probability: Option<f64>,
    /// WMO weather interpretation code
    pub weather_code: Option<i64>,
    /// Maximum wind speed at 10 m in km/h
    pub wind_speed_max: Option<f64>,
    /// Maximum wind gusts at 10 m in km/h
    pub wind_gusts_max: Option<f64>,
}
