//! Article queries, including the tag-intersection lookup.
//!
//! Tags are never loaded implicitly: every function returning [`Article`]
//! runs an explicit join over `article_tag` for the rows it returns.

use super::{placeholders, MAX_BOUND_IDS};
use crate::model::{Article, ArticleDraft, ArticleOrder, Tag};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Article row before its tags are attached.
struct ArticleRow {
    id: i64,
    title: String,
}

/// Looks up an article and its tags by primary key.
pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Article>> {
    let row = conn
        .query_row(
            "SELECT id, title FROM article WHERE id = ?1",
            [id],
            map_row_to_article,
        )
        .optional()?;

    match row {
        Some(row) => Ok(attach_tags(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Returns whether an article row exists.
pub fn exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM article WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )
}

/// Lists every article in the given order.
pub fn find_all(conn: &Connection, order: ArticleOrder) -> rusqlite::Result<Vec<Article>> {
    let sql = format!(
        "SELECT a.id, a.title FROM article a ORDER BY {}",
        order.order_by()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], map_row_to_article)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    attach_tags(conn, rows)
}

/// Lists the articles associated with **every** name in `tag_names`.
///
/// Articles are grouped over the matching association rows and kept when the
/// number of distinct matched tags equals the number of requested names. An
/// unknown name therefore yields no articles. An empty set applies no filter
/// and returns the same articles as `find_all(ArticleOrder::TitleAsc)`.
pub fn find_by_tags(
    conn: &Connection,
    tag_names: &BTreeSet<String>,
) -> rusqlite::Result<Vec<Article>> {
    if tag_names.is_empty() {
        return find_all(conn, ArticleOrder::TitleAsc);
    }

    let count = tag_names.len();
    let sql = format!(
        "SELECT a.id, a.title
         FROM article a
         JOIN article_tag link ON link.article_id = a.id
         JOIN tag t ON t.id = link.tag_id
         WHERE t.name IN ({})
         GROUP BY a.id, a.title
         HAVING COUNT(DISTINCT t.id) = ?{}
         ORDER BY {}",
        placeholders(1, count),
        count + 1,
        ArticleOrder::TitleAsc.order_by()
    );

    let mut values: Vec<Value> = tag_names.iter().cloned().map(Value::Text).collect();
    values.push(Value::Integer(count as i64));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values), map_row_to_article)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    attach_tags(conn, rows)
}

/// Inserts or updates an article and replaces its associations.
///
/// The association rows are rewritten from `draft.tags`; tags that appear
/// twice are stored once. Updating an id that does not exist fails with
/// `rusqlite::Error::QueryReturnedNoRows`. Callers wanting the row and its
/// associations to commit together pass a transaction.
pub fn save(conn: &Connection, draft: &ArticleDraft) -> rusqlite::Result<Article> {
    let id = match draft.id {
        None => {
            conn.execute("INSERT INTO article (title) VALUES (?1)", [&draft.title])?;
            conn.last_insert_rowid()
        }
        Some(id) => {
            let updated = conn.execute(
                "UPDATE article SET title = ?1 WHERE id = ?2",
                params![draft.title, id],
            )?;
            if updated == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            conn.execute("DELETE FROM article_tag WHERE article_id = ?1", [id])?;
            id
        }
    };

    let mut seen = HashSet::new();
    let mut tags: Vec<Tag> = Vec::with_capacity(draft.tags.len());
    let mut insert =
        conn.prepare_cached("INSERT INTO article_tag (article_id, tag_id) VALUES (?1, ?2)")?;
    for tag in &draft.tags {
        if seen.insert(tag.id) {
            insert.execute(params![id, tag.id])?;
            tags.push(tag.clone());
        }
    }
    tags.sort_by_key(|tag| tag.id);

    Ok(Article {
        id,
        title: draft.title.clone(),
        tags,
    })
}

/// Deletes an article. Its associations are removed by the foreign key
/// cascade. Returns `false` when no row matched.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let count = conn.execute("DELETE FROM article WHERE id = ?1", [id])?;
    Ok(count > 0)
}

/// Loads the tags of `rows` with one join query per id chunk and builds
/// full articles, preserving the order of `rows`.
fn attach_tags(conn: &Connection, rows: Vec<ArticleRow>) -> rusqlite::Result<Vec<Article>> {
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut by_article: HashMap<i64, Vec<Tag>> = HashMap::new();

    for chunk in ids.chunks(MAX_BOUND_IDS) {
        let sql = format!(
            "SELECT link.article_id, t.id, t.name
             FROM article_tag link
             JOIN tag t ON t.id = link.tag_id
             WHERE link.article_id IN ({})
             ORDER BY link.article_id ASC, t.id ASC",
            placeholders(1, chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let tagged = stmt.query_map(params_from_iter(chunk.iter()), |row| {
            let article_id: i64 = row.get(0)?;
            let tag = Tag {
                id: row.get(1)?,
                name: row.get(2)?,
            };
            Ok((article_id, tag))
        })?;
        for entry in tagged {
            let (article_id, tag) = entry?;
            by_article.entry(article_id).or_default().push(tag);
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| Article {
            tags: by_article.remove(&row.id).unwrap_or_default(),
            id: row.id,
            title: row.title,
        })
        .collect())
}

fn map_row_to_article(row: &Row) -> rusqlite::Result<ArticleRow> {
    Ok(ArticleRow {
        id: row.get(0)?,
        title: row.get(1)?,
    })
}
