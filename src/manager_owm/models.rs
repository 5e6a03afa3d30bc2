use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use chrono::{DateTime, Utc};

/// A resolved location with its canonical display name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// One daily weather entry as stored in a record snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: String,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub description: String,
    pub icon: String,
}

#[derive(Deserialize)]
pub struct GeoResult {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize)]
pub struct Main {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
}

#[derive(Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

#[serde_as]
#[derive(Deserialize)]
pub struct ForecastEntry {
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub dt: DateTime<Utc>,
    pub main: Main,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}
