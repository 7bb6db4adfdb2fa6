//! Valhalla service configuration

use serde::{Deserialize, Serialize};

use crate::error::ValhallaError;

/// Unit system for trip lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Kilometers
    #[default]
    Kilometers,
    /// Miles
    Miles,
}

/// Configuration for the Valhalla routing service
///
/// The base URL has no default: a missing URL is a startup error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValhallaConfig {
    /// Base URL of the Valhalla service (e.g. `http://localhost:8002`)
    #[serde(alias = "url")]
    pub base_url: String,

    /// Timeout for `/optimized_route` and `/route` requests in seconds
    #[serde(default = "default_route_timeout_secs")]
    pub route_timeout_secs: u64,

    /// Timeout for `/isochrone` requests in seconds
    #[serde(default = "default_isochrone_timeout_secs")]
    pub isochrone_timeout_secs: u64,

    /// Unit system requested for route lengths
    #[serde(default)]
    pub units: Units,

    /// Per-axis tolerance in degrees when matching reachable points back to candidates
    #[serde(default = "default_match_tolerance")]
    pub match_tolerance: f64,
}

const fn default_route_timeout_secs() -> u64 {
    15
}

const fn default_isochrone_timeout_secs() -> u64 {
    10
}

const fn default_match_tolerance() -> f64 {
    1e-6
}

impl ValhallaConfig {
    /// Create a configuration for the given base URL with default timeouts
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            route_timeout_secs: default_route_timeout_secs(),
            isochrone_timeout_secs: default_isochrone_timeout_secs(),
            units: Units::default(),
            match_tolerance: default_match_tolerance(),
        }
    }

    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            route_timeout_secs: 2,
            isochrone_timeout_secs: 2,
            ..Self::new(base_url)
        }
    }

    /// Load configuration from an optional `valhalla.toml` and `VALHALLA_*`
    /// environment variables (`VALHALLA_URL` sets the base URL)
    ///
    /// # Errors
    ///
    /// Returns `ValhallaError::ConfigurationError` if the base URL is missing
    /// or the resulting configuration is invalid.
    pub fn load() -> Result<Self, ValhallaError> {
        Self::load_with_env(None)
    }

    /// Like [`Self::load`], reading variables from `env` instead of the process
    /// environment when given
    pub fn load_with_env(env: Option<config::Map<String, String>>) -> Result<Self, ValhallaError> {
        Self::load_from(env, None)
    }

    /// Like [`Self::load`], with `base_url` taking precedence over the file
    /// and the environment when given
    ///
    /// Every other setting is still read and validated.
    pub fn load_with_url(base_url: Option<String>) -> Result<Self, ValhallaError> {
        Self::load_from(None, base_url)
    }

    fn load_from(
        env: Option<config::Map<String, String>>,
        base_url: Option<String>,
    ) -> Result<Self, ValhallaError> {
        let to_config_error =
            |e: config::ConfigError| ValhallaError::ConfigurationError(e.to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("valhalla").required(false))
            .add_source(
                config::Environment::with_prefix("VALHALLA")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("url", base_url)
            .map_err(to_config_error)?
            .build()
            .map_err(to_config_error)?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ValhallaError::ConfigurationError(format!("VALHALLA_URL: {e}")))?;

        loaded.validate().map_err(ValhallaError::ConfigurationError)?;
        Ok(loaded)
    }

    /// Join the base URL with an endpoint path
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            ));
        }

        if self.route_timeout_secs == 0 || self.isochrone_timeout_secs == 0 {
            return Err("timeouts must be greater than 0".to_string());
        }

        if !(self.match_tolerance.is_finite() && self.match_tolerance > 0.0) {
            return Err("match_tolerance must be a positive number".to_string());
        }

        Ok(())
    }
}
