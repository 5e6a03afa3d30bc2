pub mod errors;
pub mod models;

use std::time::Duration;
use log::error;
use reqwest::Client;
use crate::initialization;
use crate::manager_owm::REQUEST_TIMEOUT_SECS;
use crate::manager_youtube::errors::YouTubeError;
use crate::manager_youtube::models::{SearchResponse, Video};

const MAX_RESULTS: u8 = 3;

/// Optional travel video lookup, switched off when no API key is configured
pub struct YouTube {
    client: Client,
    api_key: Option<String>,
    search_url: String,
}

impl YouTube {
    /// Returns a YouTube struct
    ///
    /// # Arguments
    ///
    /// * 'config' - YouTube configuration, a missing api key disables all lookups
    pub fn new(config: &initialization::YouTube) -> Result<YouTube, YouTubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            search_url: config.search_url.clone(),
        })
    }

    /// Searches for a few travel guide videos for a location. Never fails, any problem
    /// (or a missing api key) gives an empty list.
    ///
    /// # Arguments
    ///
    /// * 'location_name' - canonical location name
    pub async fn videos(&self, location_name: &str) -> Vec<Video> {
        let Some(api_key) = &self.api_key else {
            return Vec::new();
        };

        match self.search(location_name, api_key).await {
            Ok(videos) => videos,
            Err(e) => {
                error!("video search for '{}' failed: {}", location_name, e);
                Vec::new()
            }
        }
    }

    async fn search(&self, location_name: &str, api_key: &str) -> Result<Vec<Video>, YouTubeError> {
        let query = format!("{} travel guide", location_name);
        let max_results = MAX_RESULTS.to_string();

        let response = self.client
            .get(&self.search_url)
            .query(&[
                ("part", "snippet"),
                ("q", query.as_str()),
                ("key", api_key),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
            ])
            .send().await?;

        if !response.status().is_success() {
            return Err(YouTubeError(format!("status code: {}", response.status())));
        }

        let json = response.text().await?;
        let result: SearchResponse = serde_json::from_str(&json)?;

        Ok(result.items
            .into_iter()
            .map(|item| Video {
                title: item.snippet.title,
                video_id: item.id.video_id,
                thumbnail_url: item.snippet.thumbnails.medium.url,
            })
            .collect())
    }
}
