use std::env;
use std::fs;
use log::info;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::logging::setup_logger;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Deserialize, Debug)]
pub struct General {
    pub log_path: String,
    #[serde(default)]
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Debug)]
pub struct WebServer {
    pub bind_address: String,
    pub bind_port: u16,
}

#[derive(Deserialize, Debug)]
pub struct DBConfig {
    pub db_path: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OpenWeather {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_geo_url")]
    pub geo_url: String,
    #[serde(default = "default_data_url")]
    pub data_url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct YouTube {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_search_url")]
    pub search_url: String,
}

impl Default for OpenWeather {
    fn default() -> Self {
        Self { api_key: String::new(), geo_url: default_geo_url(), data_url: default_data_url() }
    }
}

impl Default for YouTube {
    fn default() -> Self {
        Self { api_key: None, search_url: default_search_url() }
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub general: General,
    pub web_server: WebServer,
    pub db: DBConfig,
    #[serde(default)]
    pub openweather: OpenWeather,
    #[serde(default)]
    pub youtube: YouTube,
}

fn default_geo_url() -> String { "http://api.openweathermap.org/geo/1.0".to_string() }
fn default_data_url() -> String { "https://api.openweathermap.org/data/2.5".to_string() }
fn default_search_url() -> String { "https://www.googleapis.com/youtube/v3/search".to_string() }

/// Loads the configuration file, applies key overrides from the environment and
/// starts logging.
///
/// The file is read from the path in `CONFIG_PATH`, or `config.toml` if not set.
/// A missing OpenWeatherMap API key is an error.
pub fn config() -> Result<Config, ConfigError> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let toml = fs::read_to_string(&config_path)?;

    let config = parse_config(
        &toml,
        env::var("OPENWEATHER_API_KEY").ok(),
        env::var("YOUTUBE_API_KEY").ok(),
    )?;

    setup_logger(&config.general.log_path, config.general.log_to_stdout)?;

    info!("configuration loaded from {}", config_path);
    info!("OpenWeatherMap API key: loaded");
    match config.youtube.api_key {
        Some(_) => info!("YouTube API key: loaded"),
        None => info!("YouTube API key: not configured (optional)"),
    }

    Ok(config)
}

/// Parses configuration text and applies API key overrides
///
/// # Arguments
///
/// * 'toml' - the configuration file content
/// * 'owm_key' - OpenWeatherMap key from the environment, overrides the file if non-empty
/// * 'youtube_key' - YouTube key from the environment, overrides the file if non-empty
fn parse_config(toml: &str, owm_key: Option<String>, youtube_key: Option<String>) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(toml)?;

    if let Some(key) = owm_key.filter(|k| !k.trim().is_empty()) {
        config.openweather.api_key = key;
    }
    if let Some(key) = youtube_key.filter(|k| !k.trim().is_empty()) {
        config.youtube.api_key = Some(key);
    }

    config.openweather.api_key = config.openweather.api_key.trim().to_string();
    config.youtube.api_key = config.youtube.api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    if config.openweather.api_key.is_empty() {
        return Err(ConfigError::from("missing OpenWeatherMap API key (openweather.api_key or OPENWEATHER_API_KEY)"));
    }

    Ok(config)
}
