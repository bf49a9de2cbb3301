use crate::api::{with_connection, ApiError};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, RawQuery,
    },
    response::Json,
};
use quire_catalog::service::articles;
use quire_catalog::{validate_article, ArticleForm, ArticleView};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Extracts the tag filter from a raw query string.
///
/// Accepts `tags[]=a&tags[]=b`, indexed `tags[0]=a` and plain repeated
/// `tags=a&tags=b`. Empty values are ignored.
pub fn parse_tag_filter(query: Option<&str>) -> BTreeSet<String> {
    let Some(query) = query else {
        return BTreeSet::new();
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "tags" || (key.starts_with("tags[") && key.ends_with(']')))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// GET /articles
pub async fn list_articles_handler(
    Extension(state): Extension<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<ArticleView>>, ApiError> {
    let filter = parse_tag_filter(query.as_deref());
    tracing::debug!(tags = filter.len(), "listing articles");

    let views = with_connection(&state, "list_articles", move |conn| {
        Ok(articles::list(conn, &filter)?)
    })
    .await?;

    Ok(Json(views))
}

/// GET /articles/:articleId
pub async fn get_article_handler(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ArticleView>, ApiError> {
    let Path(article_id) = path?;

    let view = with_connection(&state, "get_article", move |conn| {
        Ok(articles::get(conn, article_id)?)
    })
    .await?;

    Ok(Json(view))
}

/// POST /articles
pub async fn create_article_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ArticleForm>, JsonRejection>,
) -> Result<Json<ArticleView>, ApiError> {
    let Json(form) = payload?;
    let input = validate_article(form)?;

    let view = with_connection(&state, "create_article", move |conn| {
        Ok(articles::create(conn, &input.title, &input.tag_ids)?)
    })
    .await?;

    Ok(Json(view))
}

/// PUT /articles/:articleId
///
/// An unknown id answers 404 even when the payload is also invalid.
pub async fn update_article_handler(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ArticleForm>, JsonRejection>,
) -> Result<Json<ArticleView>, ApiError> {
    let Path(article_id) = path?;
    let input = payload
        .map_err(ApiError::from)
        .and_then(|Json(form)| validate_article(form).map_err(ApiError::from));

    let view = with_connection(&state, "update_article", move |conn| {
        articles::ensure_exists(conn, article_id)?;
        let input = input?;
        Ok(articles::update(
            conn,
            article_id,
            &input.title,
            &input.tag_ids,
        )?)
    })
    .await?;

    Ok(Json(view))
}

/// DELETE /articles/:articleId
pub async fn delete_article_handler(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(article_id) = path?;

    let success = with_connection(&state, "delete_article", move |conn| {
        Ok(articles::delete(conn, article_id)?)
    })
    .await?;

    Ok(Json(json!({ "success": success })))
}
