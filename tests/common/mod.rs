//! An in-process fake of the cache service, used by the integration tests.
//!
//! `cache_service` implements the whole wire contract against an in-memory store
//! with TTLs and persist/reload snapshots. `scripted` and `echo` answer every
//! request the same way, for exercising the client's decoding and translation.
#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const ITEM_NOT_FOUND: &str = "Cache item not found";

pub fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone)]
struct Item {
    value: Value,
    expires_at: Option<Instant>,
}

impl Item {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Default)]
struct Store {
    items: HashMap<String, Item>,
    snapshot: HashMap<String, Item>,
}

impl Store {
    fn live(&mut self, key: &str) -> Option<&mut Item> {
        let now = Instant::now();
        self.items.retain(|_, item| item.is_live(now));
        self.items.get_mut(key)
    }
}

type Shared = Arc<Mutex<Store>>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, ITEM_NOT_FOUND)
}

#[derive(Deserialize)]
struct ValueQuery {
    #[serde(rename = "listIndex")]
    list_index: Option<usize>,
    #[serde(rename = "dictKey")]
    dict_key: Option<String>,
}

#[derive(Deserialize)]
struct PutQuery {
    expire: Option<u64>,
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

async fn keys(State(store): State<Shared>) -> Json<Value> {
    let mut store = store.lock().unwrap();
    let now = Instant::now();
    store.items.retain(|_, item| item.is_live(now));
    let keys: Vec<&String> = store.items.keys().collect();
    Json(json!({ "value": keys }))
}

async fn get_value(
    State(store): State<Shared>,
    Path(key): Path<String>,
    Query(query): Query<ValueQuery>,
) -> Response {
    let mut store = store.lock().unwrap();
    let Some(item) = store.live(&key) else {
        return not_found();
    };

    if let Some(index) = query.list_index {
        return match &item.value {
            Value::Array(items) => match items.get(index) {
                Some(v) => Json(json!({ "value": v })).into_response(),
                None => error(StatusCode::BAD_REQUEST, "List index out of range"),
            },
            _ => error(StatusCode::BAD_REQUEST, "Cache item is not a list"),
        };
    }

    if let Some(dict_key) = query.dict_key {
        return match &item.value {
            Value::Object(map) => match map.get(&dict_key) {
                Some(v) => Json(json!({ "value": v })).into_response(),
                None => error(StatusCode::NOT_FOUND, "Dictionary key not found"),
            },
            _ => error(StatusCode::BAD_REQUEST, "Cache item is not a dictionary"),
        };
    }

    Json(json!({ "value": item.value })).into_response()
}

async fn put_value(
    State(store): State<Shared>,
    Path(key): Path<String>,
    Query(query): Query<PutQuery>,
    Json(value): Json<Value>,
) -> Json<Value> {
    let expires_at = query
        .expire
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    store.lock().unwrap().items.insert(
        key,
        Item {
            value: value.clone(),
            expires_at,
        },
    );
    Json(json!({ "value": value }))
}

async fn delete_value(State(store): State<Shared>, Path(key): Path<String>) -> Response {
    let mut store = store.lock().unwrap();
    if store.live(&key).is_none() {
        return not_found();
    }
    store.items.remove(&key);
    Json(json!({ "message": "Cache item deleted" })).into_response()
}

async fn expire(
    State(store): State<Shared>,
    Path(key): Path<String>,
    Json(seconds): Json<u64>,
) -> Response {
    let mut store = store.lock().unwrap();
    match store.live(&key) {
        Some(item) => {
            item.expires_at = Some(Instant::now() + Duration::from_secs(seconds));
            Json(json!({ "message": "Expiration set" })).into_response()
        }
        None => not_found(),
    }
}

async fn ttl(State(store): State<Shared>, Path(key): Path<String>) -> Response {
    let mut store = store.lock().unwrap();
    match store.live(&key).and_then(|item| item.expires_at) {
        Some(at) => {
            let remaining = at.saturating_duration_since(Instant::now());
            let secs = remaining.as_millis().div_ceil(1000) as u64;
            Json(json!({ "value": secs })).into_response()
        }
        None => not_found(),
    }
}

async fn persist(State(store): State<Shared>) -> Json<Value> {
    let mut store = store.lock().unwrap();
    store.snapshot = store.items.clone();
    Json(json!({ "message": "Cache persisted" }))
}

async fn reload(State(store): State<Shared>) -> Json<Value> {
    let mut store = store.lock().unwrap();
    store.items = store.snapshot.clone();
    Json(json!({ "message": "Cache reloaded" }))
}

/// The fake cache service, mounted below `/api/v1`.
pub fn cache_service() -> Router {
    let routes = Router::new()
        .route("/ping", get(ping))
        .route("/keys", get(keys))
        .route(
            "/values/:key",
            get(get_value).put(put_value).delete(delete_value),
        )
        .route("/expire/:key", put(expire))
        .route("/ttl/:key", get(ttl))
        .route("/persist", post(persist))
        .route("/reload", post(reload))
        .with_state(Shared::default());
    Router::new().nest("/api/v1", routes)
}

/// A service that answers every request with `status` and the raw `body`.
pub fn scripted(status: StatusCode, body: &'static str) -> Router {
    Router::new().fallback(move || async move { (status, body) })
}

/// A service that answers every request after `delay`.
pub fn slow(delay: Duration) -> Router {
    Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        Json(json!({ "value": 1 }))
    })
}

/// A service that reflects the request it received back as the envelope's value.
pub fn echo() -> Router {
    Router::new().fallback(
        |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| async move {
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({
                "value": {
                    "method": method.as_str(),
                    "uri": uri.to_string(),
                    "contentType": content_type,
                    "body": String::from_utf8_lossy(&body),
                }
            }))
        },
    )
}

/// Serve `router` on an ephemeral port of the current runtime.
///
/// Returns the base URL of the service, deliberately without a trailing `/`.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

/// Serve `router` from a runtime on a background thread, for blocking clients.
pub fn spawn_on_thread(router: Router) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });
    let addr = rx.recv().unwrap();
    format!("http://{addr}/api/v1")
}

/// An address nothing is listening on.
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/v1")
}
