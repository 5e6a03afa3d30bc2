use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::manager_owm::models::Location;
use crate::manager_youtube::models::Video;

#[derive(Deserialize, Debug, Default)]
pub struct SearchRequest {
    #[serde(default)]
    pub location: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateRequest {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Fields left out keep the record's current value
#[derive(Deserialize, Debug, Default)]
pub struct UpdateRequest {
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SearchResult {
    pub location: Location,
    pub current: Value,
    pub forecast: Option<Value>,
    pub videos: Vec<Video>,
}
