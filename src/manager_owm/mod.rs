pub mod errors;
pub mod models;

use std::time::Duration;
use chrono::{Local, NaiveDate};
use log::{debug, error, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use crate::initialization::OpenWeather;
use crate::manager_owm::errors::OWMError;
use crate::manager_owm::models::{DailyWeather, Forecast, ForecastEntry, GeoResult, Location};

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
const HISTORICAL_ENTRIES: usize = 8;

/// Struct for managing geocoding and weather lookups against OpenWeatherMap
pub struct OWM {
    client: Client,
    api_key: String,
    geo_url: String,
    data_url: String,
}

impl OWM {
    /// Returns an OWM struct ready for resolving locations and fetching weather
    ///
    /// Every request is bounded by a 10 second timeout and never retried.
    ///
    /// # Arguments
    ///
    /// * 'config' - OpenWeatherMap configuration with api key and base urls
    pub fn new(config: &OpenWeather) -> Result<OWM, OWMError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            geo_url: config.geo_url.trim_end_matches('/').to_string(),
            data_url: config.data_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves free text into a canonical location.
    ///
    /// Text holding two comma separated numbers is taken as a `lat,lon` pair and reverse
    /// looked up, keeping the given coordinates. Anything else is forward geocoded.
    /// Returns `None` when the location can't be found or the provider is unavailable.
    ///
    /// # Arguments
    ///
    /// * 'query' - the user's location text
    pub async fn resolve_location(&self, query: &str) -> Option<Location> {
        match parse_coordinates(query) {
            Some((lat, lon)) => self.reverse_geocode(lat, lon).await,
            None => self.geocode(query).await,
        }
    }

    /// Forward geocodes a free form search into the single best match
    ///
    /// # Arguments
    ///
    /// * 'query' - place name, zip code or similar
    pub async fn geocode(&self, query: &str) -> Option<Location> {
        let url = format!("{}/direct", self.geo_url);
        let params = [
            ("q", query.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];

        match self.get::<Vec<GeoResult>>(&url, &params).await {
            Ok(results) => results.into_iter().next().map(|geo| Location {
                name: canonical_name(&geo),
                lat: geo.lat,
                lon: geo.lon,
            }),
            Err(e) => {
                error!("geocoding of '{}' failed: {}", query, e);
                None
            }
        }
    }

    /// Reverse geocodes a coordinate pair. Only the display name is taken from the
    /// provider, the returned location keeps the given coordinates.
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude of the location
    /// * 'lon' - longitude of the location
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> Option<Location> {
        let url = format!("{}/reverse", self.geo_url);
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("limit", "1".to_string()),
            ("appid", self.api_key.clone()),
        ];

        match self.get::<Vec<GeoResult>>(&url, &params).await {
            Ok(results) => results.into_iter().next().map(|geo| Location {
                name: canonical_name(&geo),
                lat,
                lon,
            }),
            Err(e) => {
                error!("reverse geocoding of {},{} failed: {}", lat, lon, e);
                None
            }
        }
    }

    /// Retrieves current conditions in metric units, as returned by the provider
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude of the location
    /// * 'lon' - longitude of the location
    pub async fn current(&self, lat: f64, lon: f64) -> Option<Value> {
        self.weather_data("weather", lat, lon).await
    }

    /// Retrieves the multi-day forecast (3-hour entries) in metric units, as returned by the provider
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude of the location
    /// * 'lon' - longitude of the location
    pub async fn forecast(&self, lat: f64, lon: f64) -> Option<Value> {
        self.weather_data("forecast", lat, lon).await
    }

    /// Approximates weather for a date range.
    ///
    /// The free OpenWeatherMap tier has no historical endpoint, so this returns the first
    /// 8 forecast entries (roughly the next 24 hours) regardless of the requested range.
    /// Returns an empty list if the forecast can't be fetched.
    ///
    /// # Arguments
    ///
    /// * 'lat' - latitude of the location
    /// * 'lon' - longitude of the location
    /// * 'start' - requested start date, not used for filtering
    /// * 'end' - requested end date, not used for filtering
    pub async fn historical(&self, lat: f64, lon: f64, start: NaiveDate, end: NaiveDate) -> Vec<DailyWeather> {
        debug!("approximating weather for {} to {} from forecast", start, end);

        let Some(raw) = self.forecast(lat, lon).await else {
            return Vec::new();
        };

        match serde_json::from_value::<Forecast>(raw) {
            Ok(forecast) => forecast.list
                .iter()
                .take(HISTORICAL_ENTRIES)
                .map(daily_weather)
                .collect(),
            Err(e) => {
                error!("unexpected forecast document: {}", e);
                Vec::new()
            }
        }
    }

    async fn weather_data(&self, endpoint: &str, lat: f64, lon: f64) -> Option<Value> {
        let url = format!("{}/{}", self.data_url, endpoint);
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];

        match self.get::<Value>(&url, &params).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!("fetching {} for {},{} failed: {}", endpoint, lat, lon, e);
                None
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, params: &[(&str, String)]) -> Result<T, OWMError> {
        let req = self.client
            .get(url)
            .query(params)
            .send().await?;

        let status = req.status();
        if !status.is_success() {
            return Err(OWMError::OWM(format!("Error while fetching from OpenWeatherMap: {}", status)));
        }

        let json = req.text().await?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Parses `lat,lon` text into a coordinate pair, anything after a second comma is ignored
///
/// # Arguments
///
/// * 'query' - the user's location text
fn parse_coordinates(query: &str) -> Option<(f64, f64)> {
    let mut parts = query.split(',');
    let lat: f64 = parts.next()?.trim().parse().ok()?;
    let lon: f64 = parts.next()?.trim().parse().ok()?;

    if lat.is_finite() && lon.is_finite() {
        Some((lat, lon))
    } else {
        warn!("ignoring non finite coordinates in '{}'", query);
        None
    }
}

/// Composes "Place, Region, Country", leaving out empty parts
///
/// # Arguments
///
/// * 'geo' - a geocoding result
fn canonical_name(geo: &GeoResult) -> String {
    [Some(geo.name.as_str()), geo.state.as_deref(), geo.country.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join(", ")
}

fn daily_weather(entry: &ForecastEntry) -> DailyWeather {
    let condition = entry.weather.first();

    DailyWeather {
        date: entry.dt.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        temp: round_tenth(entry.main.temp),
        temp_min: round_tenth(entry.main.temp_min),
        temp_max: round_tenth(entry.main.temp_max),
        feels_like: round_tenth(entry.main.feels_like),
        humidity: entry.main.humidity,
        description: condition.map(|c| c.description.clone()).unwrap_or_default(),
        icon: condition.map(|c| c.icon.clone()).unwrap_or_default(),
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
