use std::fmt;
use std::fmt::Formatter;

#[derive(Debug)]
pub struct YouTubeError(pub String);

impl fmt::Display for YouTubeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "YouTubeError: {}", self.0)
    }
}
impl From<reqwest::Error> for YouTubeError {
    fn from(e: reqwest::Error) -> Self { YouTubeError(e.to_string()) }
}
impl From<serde_json::Error> for YouTubeError {
    fn from(e: serde_json::Error) -> Self { YouTubeError(e.to_string()) }
}
