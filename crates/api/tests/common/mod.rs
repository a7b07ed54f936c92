use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use redline_api::config::ServerConfig;
use redline_api::router::build_app_router;
use redline_api::state::AppState;
use redline_events::EventBus;
use redline_store::DocumentStore;

/// Build a test `ServerConfig` rooted in the given temp directories.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(docs_dir: PathBuf, reviews_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        docs_dir,
        reviews_dir,
        watch_interval_secs: 1,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// A fully wired application over temp directories, with a handle on the
/// event bus so tests can observe or inject events.
pub struct TestApp {
    pub router: Router,
    pub event_bus: Arc<EventBus>,
    pub docs_dir: PathBuf,
    pub reviews_dir: PathBuf,
    // Keeps the temp directories alive for the duration of the test.
    _tmp: TempDir,
}

/// Build the full application router with all middleware layers over fresh
/// temp directories.
///
/// This mirrors the construction in `main.rs` (minus the file watcher) so
/// integration tests exercise the same middleware stack that production
/// uses.
pub async fn build_test_app() -> TestApp {
    let tmp = TempDir::new().expect("create temp dir");
    let docs_dir = tmp.path().join("plans");
    let reviews_dir = tmp.path().join("plan-reviews");

    let config = test_config(docs_dir.clone(), reviews_dir.clone());

    let store = Arc::new(DocumentStore::new(docs_dir.clone(), reviews_dir.clone()));
    store.ensure_dirs().await.expect("create store dirs");

    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    TestApp {
        router: build_app_router(state, &config),
        event_bus,
        docs_dir,
        reviews_dir,
        _tmp: tmp,
    }
}

impl TestApp {
    /// Write a markdown document into the watched directory.
    pub fn seed_document(&self, id: &str, content: &str) {
        std::fs::write(self.docs_dir.join(format!("{id}.md")), content)
            .expect("seed document");
    }

    /// Read the current on-disk text of a seeded document.
    pub fn document_text(&self, id: &str) -> String {
        std::fs::read_to_string(self.docs_dir.join(format!("{id}.md")))
            .expect("read document")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        get(self.router.clone(), uri).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        post_json(self.router.clone(), uri, body).await
    }
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body through the router.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is valid JSON")
}
