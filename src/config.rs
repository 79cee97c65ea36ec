use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FlightError;
use crate::fetch::FetchOptions;
use crate::query::Locale;

pub const DEFAULT_BASE_URL: &str = "https://google-flights2.p.rapidapi.com/api/v1";
pub const DEFAULT_API_HOST: &str = "google-flights2.p.rapidapi.com";
pub const DEFAULT_DEBOUNCE_MS: u64 = 800;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_host: String,
    pub base_url: String,
    pub timeout: u64,
    pub proxy: Option<String>,
    pub debounce: Duration,
    pub locale: Locale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: DEFAULT_API_HOST.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            proxy: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            locale: Locale::default(),
        }
    }
}

impl Config {
    /// Reads settings from the environment, falling back to defaults.
    pub fn load() -> Result<Self, FlightError> {
        Ok(Self {
            api_key: var("RAPIDAPI_KEY"),
            api_host: var("FARESIGHT_API_HOST").unwrap_or_else(|| DEFAULT_API_HOST.into()),
            base_url: var("FARESIGHT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            timeout: try_load("FARESIGHT_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
            proxy: var("FARESIGHT_PROXY"),
            debounce: Duration::from_millis(try_load(
                "FARESIGHT_DEBOUNCE_MS",
                DEFAULT_DEBOUNCE_MS,
            )?),
            locale: Locale {
                currency: var("FARESIGHT_CURRENCY").unwrap_or_default(),
                language_code: var("FARESIGHT_LANGUAGE").unwrap_or_default(),
                country_code: var("FARESIGHT_COUNTRY").unwrap_or_default(),
            },
        })
    }

    pub fn api_key(&self) -> Result<&str, FlightError> {
        self.api_key.as_deref().ok_or(FlightError::MissingApiKey)
    }

    pub fn fetch_options(&self) -> Result<FetchOptions, FlightError> {
        Ok(FetchOptions {
            base_url: self.base_url.clone(),
            api_key: self.api_key()?.to_string(),
            api_host: self.api_host.clone(),
            proxy: self.proxy.clone(),
            timeout: self.timeout,
        })
    }
}

fn var(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => {
            debug!("{key} not set");
            None
        }
    }
}

fn try_load<T>(key: &str, default: T) -> Result<T, FlightError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            FlightError::Config(format!("{key}={raw}: {e}"))
        }),
        None => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
