//! Process configuration, read from the environment (and `.env` via dotenvy).

use chrono::Duration as ChronoDuration;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::models::selection::{
    parse_coin_list, validate_refresh_interval, Currency, Days, Selection, SelectionError,
};
use crate::services::cache::{CacheSettings, DEFAULT_MAX_CAPACITY, DEFAULT_TTL_SECS};
use crate::services::transport::DEFAULT_BASE_URL;

const MAX_CACHE_TTL_SECS: i64 = 86_400;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key}={value} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub coingecko_base_url: String,
    pub coingecko_api_key: Option<String>,
    pub cache_ttl_secs: i64,
    pub cache_max_capacity: u64,
    pub http_timeout_secs: u64,
    pub bind_addr: String,
    pub defaults: Selection,
    pub refresh_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: DEFAULT_BASE_URL.to_string(),
            coingecko_api_key: None,
            cache_ttl_secs: DEFAULT_TTL_SECS,
            cache_max_capacity: DEFAULT_MAX_CAPACITY,
            http_timeout_secs: 10,
            bind_addr: "0.0.0.0:3000".to_string(),
            defaults: Selection::default(),
            refresh_interval_secs: 0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = get("COINGECKO_BASE_URL") {
            config.coingecko_base_url = url;
        }
        config.coingecko_api_key = get("COINGECKO_API_KEY");

        if let Some(raw) = get("CACHE_TTL_SECS") {
            let ttl: i64 = parse_number("CACHE_TTL_SECS", &raw)?;
            if !(1..=MAX_CACHE_TTL_SECS).contains(&ttl) {
                return Err(invalid(
                    "CACHE_TTL_SECS",
                    &raw,
                    format!("must be between 1 and {}", MAX_CACHE_TTL_SECS),
                ));
            }
            config.cache_ttl_secs = ttl;
        }

        if let Some(raw) = get("CACHE_MAX_CAPACITY") {
            let capacity: u64 = parse_number("CACHE_MAX_CAPACITY", &raw)?;
            if capacity == 0 {
                return Err(invalid("CACHE_MAX_CAPACITY", &raw, "must be positive".to_string()));
            }
            config.cache_max_capacity = capacity;
        }

        if let Some(raw) = get("HTTP_TIMEOUT_SECS") {
            let timeout: u64 = parse_number("HTTP_TIMEOUT_SECS", &raw)?;
            if timeout == 0 {
                return Err(invalid("HTTP_TIMEOUT_SECS", &raw, "must be positive".to_string()));
            }
            config.http_timeout_secs = timeout;
        }

        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Some(raw) = get("DASHBOARD_COINS") {
            config.defaults.coins = parse_coin_list(&raw)?;
        }

        if let Some(raw) = get("DASHBOARD_CURRENCY") {
            config.defaults.currency = raw.parse::<Currency>()?;
        }

        if let Some(raw) = get("DASHBOARD_DAYS") {
            config.defaults.days = Days::try_from(parse_number::<u32>("DASHBOARD_DAYS", &raw)?)?;
        }

        if let Some(raw) = get("REFRESH_INTERVAL_SECS") {
            config.refresh_interval_secs =
                validate_refresh_interval(parse_number("REFRESH_INTERVAL_SECS", &raw)?)?;
        }

        Ok(config)
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            ttl: ChronoDuration::seconds(self.cache_ttl_secs),
            max_capacity: self.cache_max_capacity,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| invalid(key, raw, "not a number".to_string()))
}

fn invalid(key: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason,
    }
}
