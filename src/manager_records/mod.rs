pub mod errors;
pub mod models;

use std::sync::Arc;
use chrono::Utc;
use log::info;
use tokio::sync::Mutex;
use crate::manager_db::DB;
use crate::manager_db::models::{NewRecord, WeatherRecord};
use crate::manager_owm::OWM;
use crate::manager_records::errors::RecordError;
use crate::manager_records::models::{CreateRequest, SearchRequest, SearchResult, UpdateRequest};
use crate::manager_youtube::YouTube;
use crate::validation::validate_date_range;

/// Ties validation, location resolution, weather fetching and persistence together.
///
/// The db lock is never held while waiting on a provider.
pub struct RecordManager {
    db: Arc<Mutex<DB>>,
    owm: OWM,
    youtube: YouTube,
}

impl RecordManager {
    pub fn new(db: Arc<Mutex<DB>>, owm: OWM, youtube: YouTube) -> Self {
        Self { db, owm, youtube }
    }

    /// Live weather lookup for a location, nothing is stored
    ///
    /// # Arguments
    ///
    /// * 'request' - the search request
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, RecordError> {
        let query = request.location.trim();
        if query.is_empty() {
            return Err(RecordError::Validation("Location is required".to_string()));
        }

        let location = self.owm.resolve_location(query).await
            .ok_or_else(|| RecordError::NotFound("Location not found".to_string()))?;

        let current = self.owm.current(location.lat, location.lon).await
            .ok_or_else(|| RecordError::Upstream("Failed to fetch weather data".to_string()))?;
        let forecast = self.owm.forecast(location.lat, location.lon).await;
        let videos = self.youtube.videos(&location.name).await;

        Ok(SearchResult { location, current, forecast, videos })
    }

    /// Creates a record for a location and date range, with a weather snapshot
    ///
    /// # Arguments
    ///
    /// * 'request' - the create request
    pub async fn create(&self, request: &CreateRequest) -> Result<WeatherRecord, RecordError> {
        let query = request.location.trim();
        let start_date = request.start_date.trim();
        let end_date = request.end_date.trim();

        if query.is_empty() {
            return Err(RecordError::Validation("Location is required".to_string()));
        }
        if start_date.is_empty() || end_date.is_empty() {
            return Err(RecordError::Validation("Date range is required".to_string()));
        }
        let (start, end) = validate_date_range(start_date, end_date)?;

        let location = self.owm.resolve_location(query).await
            .ok_or_else(|| RecordError::NotFound("Location not found. Please check spelling or try coordinates.".to_string()))?;

        let weather_data = self.owm.historical(location.lat, location.lon, start, end).await;

        let new_record = NewRecord {
            location_name: location.name,
            location_query: query.to_string(),
            latitude: location.lat,
            longitude: location.lon,
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            weather_data,
        };

        let record = self.db.lock().await.insert_record(&new_record, Utc::now())?;
        info!("created record {} for '{}'", record.id, record.location_name);

        Ok(record)
    }

    /// Returns all records, newest first
    ///
    pub async fn list(&self) -> Result<Vec<WeatherRecord>, RecordError> {
        Ok(self.db.lock().await.list_records()?)
    }

    /// Returns a single record
    ///
    /// # Arguments
    ///
    /// * 'id' - record id
    pub async fn get(&self, id: i64) -> Result<WeatherRecord, RecordError> {
        self.db.lock().await.get_record(id)?
            .ok_or_else(record_not_found)
    }

    /// Updates a record.
    ///
    /// The location is only resolved again if its text differs from the stored query,
    /// while the weather snapshot is always fetched again.
    ///
    /// # Arguments
    ///
    /// * 'id' - record id
    /// * 'request' - new field values
    pub async fn update(&self, id: i64, request: &UpdateRequest) -> Result<WeatherRecord, RecordError> {
        let mut record = self.get(id).await?;

        let query = request.location.as_deref().unwrap_or(&record.location_query).trim().to_string();
        let start_date = request.start_date.as_deref().unwrap_or(&record.start_date).trim().to_string();
        let end_date = request.end_date.as_deref().unwrap_or(&record.end_date).trim().to_string();

        let (start, end) = validate_date_range(&start_date, &end_date)?;

        if query != record.location_query {
            let location = self.owm.resolve_location(&query).await
                .ok_or_else(|| RecordError::NotFound("Location not found".to_string()))?;

            record.location_name = location.name;
            record.location_query = query;
            record.latitude = location.lat;
            record.longitude = location.lon;
        }

        record.start_date = start_date;
        record.end_date = end_date;
        record.weather_data = Some(self.owm.historical(record.latitude, record.longitude, start, end).await);

        let updated = self.db.lock().await.update_record(&record, Utc::now())?
            .ok_or_else(record_not_found)?;
        info!("updated record {}", updated.id);

        Ok(updated)
    }

    /// Deletes a record
    ///
    /// # Arguments
    ///
    /// * 'id' - record id
    pub async fn delete(&self, id: i64) -> Result<(), RecordError> {
        if self.db.lock().await.delete_record(id)? {
            info!("deleted record {}", id);
            Ok(())
        } else {
            Err(record_not_found())
        }
    }
}

fn record_not_found() -> RecordError {
    RecordError::NotFound("Record not found".to_string())
}
