//! # Async Cache Client
//!
//! `CacheClient` is the async entry point to the cache service. It holds a
//! normalized base URL, a request timeout and a `reqwest::Client`. None of these
//! change after construction, so one client can be cloned or shared across any
//! number of concurrent tasks. Clones share the underlying connection pool.
//!
//! Every operation goes through the same three steps:
//!
//! 1.  **Translate**: the operation is resolved into a method, URL and optional
//!     JSON body (see [`crate::request`]).
//! 2.  **Send**: the request is sent with `Content-Type: application/json` and the
//!     configured timeout. There is no retry.
//! 3.  **Decode**: the body is decoded as an envelope and projected into a
//!     [`Reply`] or an [`Error`] (see [`crate::envelope`]).
//!
//! HTTP status codes are not interpreted; the envelope is authoritative.

use crate::client_config::{self, ClientConfig};
use crate::envelope::{self, Reply};
use crate::request::{Operation, Request};
use crate::{CacheValue, Error, keys_from_reply, ttl_from_reply};
use log::{debug, trace};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Duration;

/// Async client for the cache service.
#[derive(Clone, Debug)]
pub struct CacheClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
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
    /// Only if the TLS backend cannot be initialized, like `reqwest::Client::new`.
    pub fn new(url: &str) -> Self {
        Self::with_timeout(url, client_config::DEFAULT_TIMEOUT)
    }

    /// Create a new client with an explicit request timeout.
    ///
    /// The timeout is applied to each request, from connecting until the whole
    /// response body has been read.
    ///
    /// # Panics
    ///
    /// Only if the TLS backend cannot be initialized, like `reqwest::Client::new`.
    pub fn with_timeout(url: &str, timeout: Duration) -> Self {
        Self {
            base_url: client_config::normalize(url),
            timeout,
            http: reqwest::Client::new(),
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

    /// Check that the service answers.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the service responded within the timeout with an envelope that
    /// carries no error.
    pub async fn connect(&self) -> Result<(), Error> {
        self.call(Operation::Ping).await.map(|_| ())
    }

    /// List the names of all live keys.
    ///
    /// # Returns
    ///
    /// The key names, or `Error::UnexpectedResponse` if the service did not answer
    /// with a list of strings.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        keys_from_reply(self.call(Operation::Keys).await?)
    }

    /// Get the value stored under `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to look up.
    ///
    /// # Returns
    ///
    /// The stored value as-is. A missing or expired key is a service error.
    pub async fn get(&self, key: &str) -> Result<CacheValue, Error> {
        self.call(Operation::Get { key }).await?.into_value()
    }

    /// Get one element of a list stored under `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The key of a list value.
    /// * `index` - Zero-based position in the list. Range is checked by the service.
    pub async fn get_list_element(&self, key: &str, index: usize) -> Result<CacheValue, Error> {
        self.call(Operation::GetListElement { key, index })
            .await?
            .into_value()
    }

    /// Get one entry of a mapping stored under `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The key of a mapping value.
    /// * `dict_key` - The entry to return. A missing entry is a service error.
    pub async fn get_dict_value(&self, key: &str, dict_key: &str) -> Result<CacheValue, Error> {
        self.call(Operation::GetDictValue { key, dict_key })
            .await?
            .into_value()
    }

    /// Store `value` under `key` without an expiration.
    ///
    /// # Returns
    ///
    /// Whatever the service projected: usually the stored value or a confirmation
    /// message.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<Reply, Error> {
        self.call(Operation::put(key, value, None)?).await
    }

    /// Store `value` under `key` and let it expire after `expire_seconds`.
    ///
    /// The service applies the TTL together with the write.
    pub async fn put_with_expire<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expire_seconds: u64,
    ) -> Result<Reply, Error> {
        self.call(Operation::put(key, value, Some(expire_seconds))?)
            .await
    }

    /// Set or replace the TTL of an existing key without rewriting its value.
    pub async fn expire(&self, key: &str, expire_seconds: u64) -> Result<Reply, Error> {
        self.call(Operation::Expire {
            key,
            seconds: expire_seconds,
        })
        .await
    }

    /// Get the remaining time-to-live of `key` in seconds.
    ///
    /// A key without a TTL and a missing key are both reported by the service as
    /// an error; the client does not tell them apart.
    pub async fn get_ttl(&self, key: &str) -> Result<u64, Error> {
        ttl_from_reply(self.call(Operation::Ttl { key }).await?)
    }

    /// Remove `key` together with its value and TTL.
    pub async fn delete(&self, key: &str) -> Result<Reply, Error> {
        self.call(Operation::Delete { key }).await
    }

    /// Ask the service to write its in-memory state to durable storage.
    pub async fn persist(&self) -> Result<Reply, Error> {
        self.call(Operation::Persist).await
    }

    /// Ask the service to drop its in-memory state and load the last snapshot.
    pub async fn reload(&self) -> Result<Reply, Error> {
        self.call(Operation::Reload).await
    }

    async fn call(&self, operation: Operation<'_>) -> Result<Reply, Error> {
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

        let response = builder.send().await?;
        trace!("{} responded with status {}", operation.name(), response.status());
        let body = response.bytes().await?;

        envelope::decode(&body)
    }
}
