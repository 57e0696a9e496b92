//! Translation of logical cache operations into HTTP requests.
//!
//! This is the wire table of the cache service. Every operation maps to a method,
//! a path below the base URL, an optional query parameter and an optional JSON body:
//!
//! | Operation        | Method | Path           | Query          | Body            |
//! |------------------|--------|----------------|----------------|-----------------|
//! | `Ping`           | GET    | `ping`         |                |                 |
//! | `Keys`           | GET    | `keys`         |                |                 |
//! | `Get`            | GET    | `values/{key}` |                |                 |
//! | `GetListElement` | GET    | `values/{key}` | `listIndex={i}`|                 |
//! | `GetDictValue`   | GET    | `values/{key}` | `dictKey={k}`  |                 |
//! | `Put`            | PUT    | `values/{key}` | `expire={s}`?  | JSON value      |
//! | `Expire`         | PUT    | `expire/{key}` |                | JSON seconds    |
//! | `Ttl`            | GET    | `ttl/{key}`    |                |                 |
//! | `Delete`         | DELETE | `values/{key}` |                |                 |
//! | `Persist`        | POST   | `persist`      |                |                 |
//! | `Reload`         | POST   | `reload`       |                |                 |
//!
//! Keys are pushed as single path segments, so they are percent-encoded and can
//! never escape into a neighbouring path or the query string. URL parsing resolves
//! `.` and `..` segments (percent-encoded or not) and an empty key would address
//! the collection itself, so those three keys are rejected with `Error::InvalidKey`.

use crate::Error;
use reqwest::Method;
use serde::Serialize;
use url::Url;

/// A logical operation against the cache service.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation<'a> {
    Ping,
    Keys,
    Get { key: &'a str },
    GetListElement { key: &'a str, index: usize },
    GetDictValue { key: &'a str, dict_key: &'a str },
    /// Store an already encoded JSON value, optionally with a TTL in seconds.
    Put {
        key: &'a str,
        body: Vec<u8>,
        expire: Option<u64>,
    },
    Expire { key: &'a str, seconds: u64 },
    Ttl { key: &'a str },
    Delete { key: &'a str },
    Persist,
    Reload,
}

/// A fully resolved HTTP request, independent of the transport that sends it.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

impl<'a> Operation<'a> {
    /// Build a `Put` operation by encoding `value` as JSON.
    ///
    /// # Returns
    ///
    /// `Error::Encode` if the value cannot be represented as JSON.
    pub fn put<T: Serialize + ?Sized>(
        key: &'a str,
        value: &T,
        expire: Option<u64>,
    ) -> Result<Self, Error> {
        let body = serde_json::to_vec(value).map_err(Error::Encode)?;
        Ok(Operation::Put { key, body, expire })
    }

    /// The key this operation addresses, if any.
    pub fn key(&self) -> Option<&'a str> {
        match self {
            Operation::Get { key }
            | Operation::GetListElement { key, .. }
            | Operation::GetDictValue { key, .. }
            | Operation::Put { key, .. }
            | Operation::Expire { key, .. }
            | Operation::Ttl { key }
            | Operation::Delete { key } => Some(*key),
            Operation::Ping | Operation::Keys | Operation::Persist | Operation::Reload => None,
        }
    }

    /// A short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Ping => "ping",
            Operation::Keys => "keys",
            Operation::Get { .. } => "get",
            Operation::GetListElement { .. } => "get_list_element",
            Operation::GetDictValue { .. } => "get_dict_value",
            Operation::Put { expire: None, .. } => "put",
            Operation::Put { expire: Some(_), .. } => "put_with_expire",
            Operation::Expire { .. } => "expire",
            Operation::Ttl { .. } => "ttl",
            Operation::Delete { .. } => "delete",
            Operation::Persist => "persist",
            Operation::Reload => "reload",
        }
    }

    /// Resolve the operation against a base URL.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The service root, expected to end with `/`.
    ///
    /// # Returns
    ///
    /// The request to send, `Error::InvalidKey` if the key cannot be a path
    /// segment, or `Error::UrlParse` if `base_url` is not a valid absolute URL.
    pub fn to_request(&self, base_url: &str) -> Result<Request, Error> {
        if let Some(key) = self.key() {
            check_key(key)?;
        }

        let (method, segments, query, body): (Method, Vec<&str>, Option<(&str, String)>, _) =
            match self {
                Operation::Ping => (Method::GET, vec!["ping"], None, None),
                Operation::Keys => (Method::GET, vec!["keys"], None, None),
                Operation::Get { key } => (Method::GET, vec!["values", *key], None, None),
                Operation::GetListElement { key, index } => (
                    Method::GET,
                    vec!["values", *key],
                    Some(("listIndex", index.to_string())),
                    None,
                ),
                Operation::GetDictValue { key, dict_key } => (
                    Method::GET,
                    vec!["values", *key],
                    Some(("dictKey", dict_key.to_string())),
                    None,
                ),
                Operation::Put { key, body, expire } => (
                    Method::PUT,
                    vec!["values", *key],
                    expire.map(|s| ("expire", s.to_string())),
                    Some(body.clone()),
                ),
                Operation::Expire { key, seconds } => (
                    Method::PUT,
                    vec!["expire", *key],
                    None,
                    Some(seconds.to_string().into_bytes()),
                ),
                Operation::Ttl { key } => (Method::GET, vec!["ttl", *key], None, None),
                Operation::Delete { key } => (Method::DELETE, vec!["values", *key], None, None),
                Operation::Persist => (Method::POST, vec!["persist"], None, None),
                Operation::Reload => (Method::POST, vec!["reload"], None, None),
            };

        let mut url = Url::parse(base_url)?;
        url.path_segments_mut()
            .map_err(|_| Error::UrlParse(url::ParseError::RelativeUrlWithoutBase))?
            .pop_if_empty()
            .extend(segments);
        if let Some((name, value)) = query {
            url.query_pairs_mut().append_pair(name, &value);
        }

        Ok(Request { method, url, body })
    }
}

fn check_key(key: &str) -> Result<(), Error> {
    match key {
        "" | "." | ".." => Err(Error::InvalidKey(key.to_string())),
        _ => Ok(()),
    }
}
