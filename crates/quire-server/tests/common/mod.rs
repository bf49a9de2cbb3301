#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use quire_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use quire_server::{app, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router over a migrated file database. The directory is removed when
/// the harness is dropped.
pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("quire-test.db");
        let pool = create_pool(
            path.to_str().expect("temp path should be utf-8"),
            DbRuntimeSettings::default(),
        )
        .expect("failed to create pool");
        {
            let conn = pool.get().expect("failed to get connection");
            run_migrations(&conn).expect("failed to run migrations");
        }

        let router = app(AppState { pool: pool.clone() });
        Self {
            router,
            pool,
            _dir: dir,
        }
    }

    /// Sends a request and returns the status and JSON body (`Null` when the
    /// body is empty or not JSON).
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        self.dispatch(request).await
    }

    /// Sends a prepared request.
    pub async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Creates a tag through the API and returns its id.
    pub async fn create_tag(&self, name: &str) -> i64 {
        let (status, json) = self
            .send("POST", "/tags", Some(serde_json::json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::OK, "tag create failed: {json}");
        json["id"].as_i64().expect("tag id should be an integer")
    }

    /// Creates an article through the API and returns its id.
    pub async fn create_article(&self, title: &str, tags: &[i64]) -> i64 {
        let (status, json) = self
            .send(
                "POST",
                "/articles",
                Some(serde_json::json!({ "title": title, "tags": tags })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "article create failed: {json}");
        json["id"].as_i64().expect("article id should be an integer")
    }
}

/// Titles of a JSON article list, in response order.
pub fn titles(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|article| {
            article["title"]
                .as_str()
                .expect("title should be a string")
                .to_string()
        })
        .collect()
}
