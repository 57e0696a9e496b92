//! # kv-cache-client
//!
//! A client for a key-value cache service that speaks JSON over HTTP.
//!
//! The client stores and retrieves scalar, list and mapping values, manages
//! per-key expiration, enumerates keys and triggers server-side persistence and
//! reload. Each operation is a thin translation: build the URL, encode the value,
//! send the request and decode the service's response envelope into a typed
//! result or a typed error.
//!
//! Two clients with the same operation set are provided:
//!
//! - [`CacheClient`]: async, to be used from inside a Tokio runtime.
//! - [`blocking::CacheClient`]: blocks the calling thread until the response is
//!   received or the timeout fires.
//!
//! Neither client retries. A timeout or transport error is returned to the caller
//! immediately.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kv_cache_client::CacheClient;
//!
//! # async fn run() -> Result<(), kv_cache_client::Error> {
//! let client = CacheClient::new("http://localhost:8080/api/v1");
//!
//! client.put("cars", &["Toyota", "Opel", "Ford"]).await?;
//! let car = client.get_list_element("cars", 1).await?;
//! assert_eq!(car.as_str(), Some("Opel"));
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod client;
pub mod client_config;
pub mod envelope;
pub mod request;
pub mod value;

pub use client::CacheClient;
pub use client_config::ClientConfig;
pub use envelope::{Envelope, Reply};
pub use value::CacheValue;

/// Different types of errors that can occur when using the client.
///
/// The variants keep apart "the request never got an answer" (`Transport`),
/// "the answer could not be read" (`Decode`) and "the service said no" (`Service`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection refused, timeout, DNS failure or an interrupted body.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not a JSON object.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The service reported an error. The text is exactly what the service sent.
    #[error("{0}")]
    Service(String),

    /// The envelope was valid but has the wrong shape for the operation.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The value passed in could not be serialized to JSON.
    #[error("Encode error: {0}")]
    Encode(serde_json::Error),

    /// The key cannot be sent as a path segment (`""`, `"."` or `".."`).
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Url parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Service(_))
    }

    /// The message of a service error, `None` for every other kind.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Error::Service(m) => Some(m),
            _ => None,
        }
    }

    /// True if the request did not complete within the configured timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Project the list of key names out of a `keys` reply.
pub(crate) fn keys_from_reply(reply: Reply) -> Result<Vec<String>, Error> {
    match reply.into_value()? {
        CacheValue::List(items) => items
            .into_iter()
            .map(|item| match item {
                CacheValue::String(key) => Ok(key),
                other => Err(Error::UnexpectedResponse(format!(
                    "expected key names, got a {} entry",
                    other.kind()
                ))),
            })
            .collect(),
        other => Err(Error::UnexpectedResponse(format!(
            "expected a list of keys, got a {}",
            other.kind()
        ))),
    }
}

/// Project the remaining time-to-live out of a `ttl` reply.
pub(crate) fn ttl_from_reply(reply: Reply) -> Result<u64, Error> {
    let value = reply.into_value()?;
    value.as_u64().ok_or_else(|| {
        Error::UnexpectedResponse(format!(
            "expected a non-negative integer ttl, got {value}"
        ))
    })
}
