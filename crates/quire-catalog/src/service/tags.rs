//! Tag use cases. Tag names are unique: creating or renaming to a name held
//! by another tag is a `Conflict`.

use super::write_transaction;
use crate::error::CatalogError;
use crate::model::TagDraft;
use crate::repo::tags as tag_repo;
use crate::view::TagView;
use rusqlite::Connection;

/// Lists all tags ordered by name.
pub fn list(conn: &Connection) -> Result<Vec<TagView>, CatalogError> {
    let tags = tag_repo::find_all(conn)?;
    Ok(tags.into_iter().map(TagView::from).collect())
}

/// Fetches one tag.
pub fn get(conn: &Connection, id: i64) -> Result<TagView, CatalogError> {
    tag_repo::find_by_id(conn, id)?
        .map(TagView::from)
        .ok_or_else(|| CatalogError::tag_not_found(id))
}

/// Fails with `NotFound` unless the tag exists.
pub fn ensure_exists(conn: &Connection, id: i64) -> Result<(), CatalogError> {
    tag_repo::find_by_id(conn, id)?
        .map(|_| ())
        .ok_or_else(|| CatalogError::tag_not_found(id))
}

/// Creates a tag.
pub fn create(conn: &mut Connection, name: &str) -> Result<TagView, CatalogError> {
    let tx = write_transaction(conn)?;
    if tag_repo::find_by_name(&tx, name)?.is_some() {
        return Err(CatalogError::duplicate_tag(name));
    }
    let tag = tag_repo::save(
        &tx,
        &TagDraft {
            id: None,
            name: name.to_string(),
        },
    )
    .map_err(|e| unique_violation_to_conflict(e, name))?;
    tx.commit()?;

    tracing::info!(tag_id = tag.id, "tag created");
    Ok(tag.into())
}

/// Renames a tag. Keeping the current name is allowed.
pub fn update(conn: &mut Connection, id: i64, name: &str) -> Result<TagView, CatalogError> {
    let tx = write_transaction(conn)?;
    ensure_exists(&tx, id)?;
    if let Some(holder) = tag_repo::find_by_name(&tx, name)? {
        if holder.id != id {
            return Err(CatalogError::duplicate_tag(name));
        }
    }
    let tag = tag_repo::save(
        &tx,
        &TagDraft {
            id: Some(id),
            name: name.to_string(),
        },
    )
    .map_err(|e| unique_violation_to_conflict(e, name))?;
    tx.commit()?;

    tracing::info!(tag_id = id, "tag updated");
    Ok(tag.into())
}

fn unique_violation_to_conflict(e: rusqlite::Error, name: &str) -> CatalogError {
    match e {
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            CatalogError::duplicate_tag(name)
        }
        other => CatalogError::Database(other),
    }
}
