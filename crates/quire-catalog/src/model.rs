//! Persisted entities as plain values.

/// A label attachable to many articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Database id.
    pub id: i64,
    /// Display name, at most 50 characters.
    pub name: String,
}

/// An article together with its tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Database id.
    pub id: i64,
    /// Title, at most 100 characters.
    pub title: String,
    /// Associated tags ordered by id, without duplicates.
    pub tags: Vec<Tag>,
}

/// Article state to persist. `id: None` inserts a new row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub id: Option<i64>,
    pub title: String,
    /// Replaces every existing association of the article.
    pub tags: Vec<Tag>,
}

/// Tag state to persist. `id: None` inserts a new row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub id: Option<i64>,
    pub name: String,
}

/// Ordering for article listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArticleOrder {
    /// Title ascending, equal titles by id ascending.
    #[default]
    TitleAsc,
    /// Insertion order.
    IdAsc,
}

impl ArticleOrder {
    /// `ORDER BY` clause body over the `article` table aliased as `a`.
    pub(crate) fn order_by(self) -> &'static str {
        match self {
            Self::TitleAsc => "a.title ASC, a.id ASC",
            Self::IdAsc => "a.id ASC",
        }
    }
}
