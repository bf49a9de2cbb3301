//! Transfer objects returned across the HTTP boundary.

use crate::model::{Article, Tag};
use serde::{Deserialize, Serialize};

/// Serialized form of a tag, also used as the tag summary nested in articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagView {
    pub id: i64,
    pub name: String,
}

/// Serialized form of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleView {
    pub id: i64,
    pub title: String,
    pub tags: Vec<TagView>,
}

impl From<Tag> for TagView {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            tags: article.tags.into_iter().map(TagView::from).collect(),
        }
    }
}
