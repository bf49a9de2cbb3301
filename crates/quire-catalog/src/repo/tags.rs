//! Tag queries.

use super::{placeholders, MAX_BOUND_IDS};
use crate::model::{Tag, TagDraft};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

/// Looks up a tag by primary key.
pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Tag>> {
    conn.query_row("SELECT id, name FROM tag WHERE id = ?1", [id], map_row_to_tag)
        .optional()
}

/// Looks up a tag by exact name.
pub fn find_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        "SELECT id, name FROM tag WHERE name = ?1",
        [name],
        map_row_to_tag,
    )
    .optional()
}

/// Resolves a list of ids to existing tags, ordered by id.
///
/// Ids without a matching row are skipped and duplicates collapse.
pub fn find_by_ids(conn: &Connection, ids: &[i64]) -> rusqlite::Result<Vec<Tag>> {
    let unique: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let mut tags = Vec::with_capacity(unique.len());

    for chunk in unique.chunks(MAX_BOUND_IDS) {
        let sql = format!(
            "SELECT id, name FROM tag WHERE id IN ({}) ORDER BY id ASC",
            placeholders(1, chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), map_row_to_tag)?;
        for row in rows {
            tags.push(row?);
        }
    }

    Ok(tags)
}

/// Lists every tag by name, equal names by id.
pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tag ORDER BY name ASC, id ASC")?;
    let rows = stmt.query_map([], map_row_to_tag)?;
    rows.collect()
}

/// Inserts or updates a tag.
///
/// Updating an id that does not exist fails with
/// `rusqlite::Error::QueryReturnedNoRows`.
pub fn save(conn: &Connection, draft: &TagDraft) -> rusqlite::Result<Tag> {
    let id = match draft.id {
        None => {
            conn.execute("INSERT INTO tag (name) VALUES (?1)", [&draft.name])?;
            conn.last_insert_rowid()
        }
        Some(id) => {
            let updated = conn.execute(
                "UPDATE tag SET name = ?1 WHERE id = ?2",
                params![draft.name, id],
            )?;
            if updated == 0 {
                return Err(rusqlite::Error::QueryReturnedNoRows);
            }
            id
        }
    };

    Ok(Tag {
        id,
        name: draft.name.clone(),
    })
}

fn map_row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        quire_db::run_migrations(&conn).expect("migrations should succeed");
        conn
    }

    fn insert(conn: &Connection, name: &str) -> Tag {
        save(
            conn,
            &TagDraft {
                id: None,
                name: name.to_string(),
            },
        )
        .expect("insert should succeed")
    }

    #[test]
    fn save_assigns_ids_and_updates_in_place() {
        let conn = test_db();
        let go = insert(&conn, "go");
        assert!(go.id > 0);

        let renamed = save(
            &conn,
            &TagDraft {
                id: Some(go.id),
                name: "golang".to_string(),
            },
        )
        .expect("update should succeed");
        assert_eq!(renamed.id, go.id);
        assert_eq!(
            find_by_id(&conn, go.id).expect("lookup should succeed"),
            Some(renamed)
        );
    }

    #[test]
    fn save_unknown_id_reports_no_rows() {
        let conn = test_db();
        let err = save(
            &conn,
            &TagDraft {
                id: Some(99),
                name: "ghost".to_string(),
            },
        )
        .expect_err("update of missing row should fail");
        assert!(matches!(err, rusqlite::Error::QueryReturnedNoRows));
    }

    #[test]
    fn find_by_ids_skips_unknown_and_duplicate_ids() {
        let conn = test_db();
        let go = insert(&conn, "go");
        let rust = insert(&conn, "rust");

        let found = find_by_ids(&conn, &[rust.id, 404, go.id, rust.id])
            .expect("lookup should succeed");
        assert_eq!(found, vec![go, rust]);

        assert!(find_by_ids(&conn, &[]).expect("empty lookup").is_empty());
    }

    #[test]
    fn find_all_orders_by_name() {
        let conn = test_db();
        insert(&conn, "zig");
        insert(&conn, "ada");
        insert(&conn, "lua");

        let names: Vec<String> = find_all(&conn)
            .expect("list should succeed")
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        assert_eq!(names, vec!["ada", "lua", "zig"]);
    }

    #[test]
    fn find_by_name_is_exact() {
        let conn = test_db();
        let rust = insert(&conn, "rust");

        assert_eq!(find_by_name(&conn, "rust").expect("lookup"), Some(rust));
        assert_eq!(find_by_name(&conn, "Rust").expect("lookup"), None);
    }
}
