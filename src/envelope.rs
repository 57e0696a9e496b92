//! # Response Envelope
//!
//! Every response of the cache service is a single JSON object carrying at most one
//! of three fields:
//!
//! - `error`: a description of why the request failed
//! - `value`: the stored value (or part of it) the request asked for
//! - `message`: a human readable confirmation
//!
//! `Envelope::into_reply` turns a decoded envelope into either a typed `Reply` or a
//! typed `Error`. The fields are inspected in a fixed order: `error` wins over
//! `value`, which wins over `message`. A misbehaving service that fills in both
//! `error` and `value` therefore always produces an error.
//!
//! Unknown keys in the object are ignored.

use crate::{CacheValue, Error};
use log::trace;
use serde_json::{Map, Value};

const ERROR_FIELD: &str = "error";
const VALUE_FIELD: &str = "value";
const MESSAGE_FIELD: &str = "message";

/// The successful outcome of a request, projected out of the envelope.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// The envelope carried a `value` field. Presence counts, not truthiness:
    /// `0`, `""`, `false`, `[]` and `null` are all values.
    Value(CacheValue),
    /// The envelope carried a `message` field and no `value`.
    Message(String),
    /// The envelope carried none of the known fields.
    NoContent,
}

impl Reply {
    pub fn value(&self) -> Option<&CacheValue> {
        match self {
            Reply::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Reply::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Consumes the reply and returns the value it carried.
    ///
    /// # Returns
    ///
    /// `Error::UnexpectedResponse` when the reply is a message or has no content.
    pub fn into_value(self) -> Result<CacheValue, Error> {
        match self {
            Reply::Value(v) => Ok(v),
            Reply::Message(m) => Err(Error::UnexpectedResponse(format!(
                "expected a value, got message {m:?}"
            ))),
            Reply::NoContent => Err(Error::UnexpectedResponse(
                "expected a value, got an empty response".to_string(),
            )),
        }
    }
}

/// A decoded response body.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    /// Parse a raw response body into an envelope.
    ///
    /// # Arguments
    ///
    /// * `body` - The bytes of the HTTP response body.
    ///
    /// # Returns
    ///
    /// `Error::Decode` if the body is empty, is not valid JSON, or is valid JSON
    /// that is not an object.
    pub fn parse(body: &[u8]) -> Result<Self, Error> {
        trace!("Response body {}", String::from_utf8_lossy(body));
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::Decode("empty response body".to_string()));
        }
        let value: Value = serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))?;
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(Error::Decode(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Decide the outcome of a request from its envelope.
    ///
    /// The order of the checks is the contract: a non-empty `error` always fails the
    /// call, then a present `value` is the result, then a `message`, and finally an
    /// envelope with none of them is `Reply::NoContent`.
    pub fn into_reply(mut self) -> Result<Reply, Error> {
        if let Some(error) = self.fields.remove(ERROR_FIELD) {
            match error {
                Value::Null => {}
                Value::String(s) if s.is_empty() => {}
                Value::String(s) => return Err(Error::Service(s)),
                other => return Err(Error::Service(other.to_string())),
            }
        }

        if let Some(value) = self.fields.remove(VALUE_FIELD) {
            return Ok(Reply::Value(value.into()));
        }

        match self.fields.remove(MESSAGE_FIELD) {
            Some(Value::String(message)) => Ok(Reply::Message(message)),
            Some(Value::Null) | None => Ok(Reply::NoContent),
            Some(other) => Ok(Reply::Message(other.to_string())),
        }
    }
}

impl From<Map<String, Value>> for Envelope {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse a body and decide its outcome in one step.
pub(crate) fn decode(body: &[u8]) -> Result<Reply, Error> {
    Envelope::parse(body)?.into_reply()
}
