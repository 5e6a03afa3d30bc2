use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub title: String,
    pub video_id: String,
    pub thumbnail_url: String,
}

#[derive(Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Deserialize)]
pub struct SearchItem {
    pub id: ItemId,
    pub snippet: Snippet,
}

#[derive(Deserialize)]
pub struct ItemId {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

#[derive(Deserialize)]
pub struct Snippet {
    pub title: String,
    pub thumbnails: Thumbnails,
}

#[derive(Deserialize)]
pub struct Thumbnails {
    pub medium: Thumbnail,
}

#[derive(Deserialize)]
pub struct Thumbnail {
    pub url: String,
}
