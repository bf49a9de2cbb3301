use crate::api::{with_connection, ApiError};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    response::Json,
};
use quire_catalog::service::tags;
use quire_catalog::{validate_tag, TagForm, TagView};
use std::sync::Arc;

/// GET /tags
pub async fn list_tags_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<TagView>>, ApiError> {
    let views = with_connection(&state, "list_tags", |conn| Ok(tags::list(conn)?)).await?;
    Ok(Json(views))
}

/// GET /tags/:tagId
pub async fn get_tag_handler(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TagView>, ApiError> {
    let Path(tag_id) = path?;
    let view = with_connection(&state, "get_tag", move |conn| Ok(tags::get(conn, tag_id)?)).await?;
    Ok(Json(view))
}

/// POST /tags
///
/// A name already held by another tag answers 409.
pub async fn create_tag_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<TagForm>, JsonRejection>,
) -> Result<Json<TagView>, ApiError> {
    let Json(form) = payload?;
    let input = validate_tag(form)?;

    let view = with_connection(&state, "create_tag", move |conn| {
        Ok(tags::create(conn, &input.name)?)
    })
    .await?;

    Ok(Json(view))
}

/// PUT /tags/:tagId
///
/// An unknown id answers 404 before the payload is looked at.
pub async fn update_tag_handler(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TagForm>, JsonRejection>,
) -> Result<Json<TagView>, ApiError> {
    let Path(tag_id) = path?;
    let input = payload
        .map_err(ApiError::from)
        .and_then(|Json(form)| validate_tag(form).map_err(ApiError::from));

    let view = with_connection(&state, "update_tag", move |conn| {
        tags::ensure_exists(conn, tag_id)?;
        let input = input?;
        Ok(tags::update(conn, tag_id, &input.name)?)
    })
    .await?;

    Ok(Json(view))
}
