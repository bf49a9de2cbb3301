//! Article use cases.

use super::{read_snapshot, write_transaction};
use crate::error::CatalogError;
use crate::model::ArticleDraft;
use crate::repo::{articles as article_repo, tags as tag_repo};
use crate::view::ArticleView;
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Lists the articles carrying every tag in `tag_filter`; an empty filter
/// lists all articles.
pub fn list(
    conn: &Connection,
    tag_filter: &BTreeSet<String>,
) -> Result<Vec<ArticleView>, CatalogError> {
    let articles = read_snapshot(conn, |conn| {
        Ok(article_repo::find_by_tags(conn, tag_filter)?)
    })?;
    Ok(articles.into_iter().map(ArticleView::from).collect())
}

/// Fetches one article.
pub fn get(conn: &Connection, id: i64) -> Result<ArticleView, CatalogError> {
    read_snapshot(conn, |conn| Ok(article_repo::find_by_id(conn, id)?))?
        .map(ArticleView::from)
        .ok_or_else(|| CatalogError::article_not_found(id))
}

/// Fails with `NotFound` unless the article exists.
pub fn ensure_exists(conn: &Connection, id: i64) -> Result<(), CatalogError> {
    if article_repo::exists(conn, id)? {
        Ok(())
    } else {
        Err(CatalogError::article_not_found(id))
    }
}

/// Creates an article tagged with the existing tags among `tag_ids`.
///
/// Ids that do not resolve to a tag are dropped silently.
pub fn create(
    conn: &mut Connection,
    title: &str,
    tag_ids: &[i64],
) -> Result<ArticleView, CatalogError> {
    let tx = write_transaction(conn)?;
    let tags = tag_repo::find_by_ids(&tx, tag_ids)?;
    let article = article_repo::save(
        &tx,
        &ArticleDraft {
            id: None,
            title: title.to_string(),
            tags,
        },
    )?;
    tx.commit()?;

    tracing::info!(
        article_id = article.id,
        tag_count = article.tags.len(),
        "article created"
    );
    Ok(article.into())
}

/// Replaces the title and the full tag set of an article.
pub fn update(
    conn: &mut Connection,
    id: i64,
    title: &str,
    tag_ids: &[i64],
) -> Result<ArticleView, CatalogError> {
    let tx = write_transaction(conn)?;
    ensure_exists(&tx, id)?;
    let tags = tag_repo::find_by_ids(&tx, tag_ids)?;
    let article = article_repo::save(
        &tx,
        &ArticleDraft {
            id: Some(id),
            title: title.to_string(),
            tags,
        },
    )?;
    tx.commit()?;

    tracing::info!(
        article_id = id,
        tag_count = article.tags.len(),
        "article updated"
    );
    Ok(article.into())
}

/// Deletes an article and its associations. Always `true` on success.
pub fn delete(conn: &mut Connection, id: i64) -> Result<bool, CatalogError> {
    let tx = write_transaction(conn)?;
    if !article_repo::delete(&tx, id)? {
        return Err(CatalogError::article_not_found(id));
    }
    tx.commit()?;

    tracing::info!(article_id = id, "article deleted");
    Ok(true)
}
