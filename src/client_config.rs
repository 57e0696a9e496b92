//! Configuration management for the cache client.
//!
//! This module provides the `ClientConfig` struct, which holds everything a
//! `CacheClient` needs: the base URL of the cache service and the timeout applied
//! to every request. It supports both direct configuration and environment
//! variable-based configuration.
//!
//! # Examples
//!
//! ## Direct Configuration
//!
//! ```rust
//! use kv_cache_client::client_config::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig {
//!     base_url: "http://cache-server:8080/api/v1".to_string(),
//!     timeout: Duration::from_millis(500),
//! };
//! assert_eq!(config.normalized_base_url(), "http://cache-server:8080/api/v1/");
//! ```
//!
//! ## Environment Variable Configuration
//!
//! ```rust,no_run
//! use kv_cache_client::client_config::ClientConfig;
//!
//! // Requires the KV_CACHE_URL environment variable
//! let config = ClientConfig::from_env()?;
//! # Ok::<(), kv_cache_client::client_config::Error>(())
//! ```

use std::time::Duration;

/// Timeout applied to each request when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const URL_VAR: &str = "KV_CACHE_URL";
const TIMEOUT_VAR: &str = "KV_CACHE_TIMEOUT_MS";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Environment variable is not set: {1}")]
    EnvVar(std::env::VarError, String),
    #[error("Invalid timeout in milliseconds: {0}")]
    InvalidTimeout(String),
}

/// Configuration settings for the cache client.
///
/// # Fields
///
/// - `base_url`: The root URL of the cache service. Operation paths such as
///   `values/{key}` are resolved below it. A missing trailing `/` is added when the
///   client is built.
/// - `timeout`: The upper bound on each request, from connecting until the whole
///   response body has been read.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// The cache service URL, e.g. "http://localhost:8080/api/v1/".
    pub base_url: String,

    /// Time allowed for a single request.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1/".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a new configuration from environment variables.
    ///
    /// `KV_CACHE_URL` is required. `KV_CACHE_TIMEOUT_MS` is optional and defaults
    /// to two seconds.
    ///
    /// # Returns
    ///
    /// A new configuration instance.
    pub fn from_env() -> Result<Self, Error> {
        let base_url =
            std::env::var(URL_VAR).map_err(|e| Error::EnvVar(e, URL_VAR.to_string()))?;
        let timeout = parse_timeout(std::env::var(TIMEOUT_VAR).ok().as_deref())?;
        Ok(Self { base_url, timeout })
    }

    /// Returns the base URL terminated with exactly the separator the service
    /// paths are appended to.
    ///
    /// # Examples
    ///
    /// - `"http://localhost:8080/api/v1"` becomes `"http://localhost:8080/api/v1/"`.
    /// - `"http://localhost:8080/api/v1/"` is returned unchanged.
    pub fn normalized_base_url(&self) -> String {
        normalize(&self.base_url)
    }
}

pub(crate) fn normalize(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn parse_timeout(millis: Option<&str>) -> Result<Duration, Error> {
    match millis {
        None => Ok(DEFAULT_TIMEOUT),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| Error::InvalidTimeout(s.to_string())),
    }
}
