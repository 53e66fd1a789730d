//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `LOOKOOT_SEARCH_DEBOUNCE_MS` - Quiet period before a search runs (default: 300)
//! - `LOOKOOT_SEARCH_RADIUS_KM` - Initial store search radius (default: 5)
//! - `LOOKOOT_DEFAULT_LATITUDE` - Search origin latitude (default: 55.8642)
//! - `LOOKOOT_DEFAULT_LONGITUDE` - Search origin longitude (default: -4.2518)
//! - `LOOKOOT_STORE_DETAIL_TIMEOUT_MS` - Bounded wait for a store's detail view (default: 10000)
//! - `LOOKOOT_CACHE_TTL_SECS` - Store lookup cache lifetime (default: 300)
//! - `LOOKOOT_STORAGE_BASE_URL` - Base URL for object storage downloads (default: `memory://lookoot`)

use std::str::FromStr;
use std::time::Duration;

use lookoot_core::GeoPoint;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Search manager settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search runs
    pub debounce: Duration,
    /// Initial store search radius in kilometres
    pub radius_km: f64,
    /// Search origin until the caller provides a location
    pub default_location: GeoPoint,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            radius_km: 5.0,
            default_location: GeoPoint::GLASGOW,
        }
    }
}

/// Lookoot client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Search manager settings
    pub search: SearchConfig,
    /// Bounded wait used when loading a single store's detail view
    pub store_detail_timeout: Duration,
    /// How long store lookups stay cached
    pub cache_ttl: Duration,
    /// Base URL that object storage download links are built from
    pub storage_base_url: Url,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            store_detail_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
            storage_base_url: default_storage_url(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let debounce_ms: u64 = parse_or(&lookup, "LOOKOOT_SEARCH_DEBOUNCE_MS", 300)?;
        let radius_km: f64 =
            parse_or(&lookup, "LOOKOOT_SEARCH_RADIUS_KM", defaults.search.radius_km)?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ConfigError::InvalidEnvVar(
                "LOOKOOT_SEARCH_RADIUS_KM".to_string(),
                "must be a positive number".to_string(),
            ));
        }
        let latitude: f64 = parse_or(
            &lookup,
            "LOOKOOT_DEFAULT_LATITUDE",
            defaults.search.default_location.latitude,
        )?;
        let longitude: f64 = parse_or(
            &lookup,
            "LOOKOOT_DEFAULT_LONGITUDE",
            defaults.search.default_location.longitude,
        )?;
        let timeout_ms: u64 = parse_or(&lookup, "LOOKOOT_STORE_DETAIL_TIMEOUT_MS", 10_000)?;
        let cache_ttl_secs: u64 = parse_or(&lookup, "LOOKOOT_CACHE_TTL_SECS", 300)?;
        let storage_base_url = match lookup("LOOKOOT_STORAGE_BASE_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("LOOKOOT_STORAGE_BASE_URL".to_string(), e.to_string())
            })?,
            None => defaults.storage_base_url,
        };

        Ok(Self {
            search: SearchConfig {
                debounce: Duration::from_millis(debounce_ms),
                radius_km,
                default_location: GeoPoint::new(latitude, longitude),
            },
            store_detail_timeout: Duration::from_millis(timeout_ms),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            storage_base_url,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_storage_url() -> Url {
    Url::parse("memory://lookoot").unwrap_or_else(|_| unreachable!("static URL is valid"))
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
