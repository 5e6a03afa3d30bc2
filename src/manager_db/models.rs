use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::manager_owm::models::DailyWeather;

/// A persisted weather record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub id: i64,
    pub location_name: String,
    pub location_query: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub weather_data: Option<Vec<DailyWeather>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values for a record that is yet to be inserted
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub location_name: String,
    pub location_query: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub weather_data: Vec<DailyWeather>,
}

/// A row as read from the weather_records table, before json and timestamps are decoded
pub struct RecordRow {
    pub id: i64,
    pub location_name: String,
    pub location_query: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub weather_data: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
