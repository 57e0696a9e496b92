//! A blocking cache client.
//!
//! The same operations as [`crate::CacheClient`], but every call blocks the current
//! thread until the response has been fully received or the timeout fires.
//!
//! This client wraps `reqwest::blocking::Client` and therefore must not be
//! created, used or dropped from within an async runtime.

use crate::client_config::{self, ClientConfig};
use crate::envelope::{self, Reply};
use crate::request::{Operation, Request};
use crate::{CacheValue, Error, keys_from_reply, ttl_from_reply};
use log::{debug, trace};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Duration;

/// Blocking client for the cache service.
///
/// Shareable across threads by reference or by cloning; clones share the
/// underlying connection pool.
#[derive(Clone, Debug)]
pub struct CacheClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::blocking::Client,
}

impl CacheClient {
    /// Create a new client with the default two second timeout.
    ///
    /// No network I/O happens here and the URL is not validated. An unusable URL
    /// is reported by the first operation as `Error::UrlParse`.
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL of the cache service. A trailing `/` is added if absent.
    ///
    /// # Panics
    ///
    /// Only if the TLS backend cannot be initialized, like
    /// `reqwest::blocking::Client::new`.
    pub fn new(url: &str) -> Self {
        Self::with_timeout(url, client_config::DEFAULT_TIMEOUT)
    }

    /// Create a new client with an explicit request timeout.
    ///
    /// # Panics
    ///
    /// Only if the TLS backend cannot be initialized.
    pub fn with_timeout(url: &str, timeout: Duration) -> Self {
        Self {
            base_url: client_config::normalize(url),
            timeout,
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Create a new client from a `ClientConfig`.
    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_timeout(&config.base_url, config.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check that the service answers within the timeout without an error.
    pub fn connect(&self) -> Result<(), Error> {
        self.call(Operation::Ping).map(|_| ())
    }

    /// List the names of all live keys.
    ///
    /// # Returns
    ///
    /// The key names, or `Error::UnexpectedResponse` if the service did not answer
    /// with a list of strings.
    pub fn keys(&self) -> Result<Vec<String>, Error> {
        keys_from_reply(self.call(Operation::Keys)?)
    }

    /// Get the value stored under `key`. A missing or expired key is a service error.
    pub fn get(&self, key: &str) -> Result<CacheValue, Error> {
        self.call(Operation::Get { key })?.into_value()
    }

    /// Get one element of a list stored under `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The key of a list value.
    /// * `index` - Zero-based position in the list. Range is checked by the service.
    pub fn get_list_element(&self, key: &str, index: usize) -> Result<CacheValue, Error> {
        self.call(Operation::GetListElement { key, index })?
            .into_value()
    }

    /// Get one entry of a mapping stored under `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The key of a mapping value.
    /// * `dict_key` - The entry to return. A missing entry is a service error.
    pub fn get_dict_value(&self, key: &str, dict_key: &str) -> Result<CacheValue, Error> {
        self.call(Operation::GetDictValue { key, dict_key })?
            .into_value()
    }

    /// Store `value` under `key` without an expiration.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<Reply, Error> {
        self.call(Operation::put(key, value, None)?)
    }

    /// Store `value` under `key` and let it expire after `expire_seconds`.
    pub fn put_with_expire<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expire_seconds: u64,
    ) -> Result<Reply, Error> {
        self.call(Operation::put(key, value, Some(expire_seconds))?)
    }

    /// Set or replace the TTL of an existing key without rewriting its value.
    pub fn expire(&self, key: &str, expire_seconds: u64) -> Result<Reply, Error> {
        self.call(Operation::Expire {
            key,
            seconds: expire_seconds,
        })
    }

    /// Get the remaining time-to-live of `key` in seconds.
    pub fn get_ttl(&self, key: &str) -> Result<u64, Error> {
        ttl_from_reply(self.call(Operation::Ttl { key })?)
    }

    /// Remove `key` together with its value and TTL.
    pub fn delete(&self, key: &str) -> Result<Reply, Error> {
        self.call(Operation::Delete { key })
    }

    /// Ask the service to write its in-memory state to durable storage.
    pub fn persist(&self) -> Result<Reply, Error> {
        self.call(Operation::Persist)
    }

    /// Ask the service to drop its in-memory state and load the last snapshot.
    pub fn reload(&self) -> Result<Reply, Error> {
        self.call(Operation::Reload)
    }

    fn call(&self, operation: Operation<'_>) -> Result<Reply, Error> {
        let Request { method, url, body } = operation.to_request(&self.base_url)?;
        debug!("{} {} {}", operation.name(), method, url);

        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout);
        if let Some(body) = body {
            trace!("Request body {}", String::from_utf8_lossy(&body));
            builder = builder.body(body);
        }

        let response = builder.send()?;
        trace!("{} responded with status {}", operation.name(), response.status());
        let body = response.bytes()?;

        envelope::decode(&body)
    }
}
