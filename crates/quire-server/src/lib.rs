//! quire HTTP server library logic.

pub mod api;
pub mod api_articles;
pub mod api_tags;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Extension, Json, Router,
};
use quire_db::DbPool;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
}

/// Maximum request body size (64 KiB). Article and tag payloads are small.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/articles",
            get(api_articles::list_articles_handler).post(api_articles::create_article_handler),
        )
        .route(
            "/articles/{articleId}",
            get(api_articles::get_article_handler)
                .put(api_articles::update_article_handler)
                .delete(api_articles::delete_article_handler),
        )
        .route(
            "/tags",
            get(api_tags::list_tags_handler).post(api_tags::create_tag_handler),
        )
        .route(
            "/tags/{tagId}",
            get(api_tags::get_tag_handler).put(api_tags::update_tag_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
