//! Error types for catalog services.

/// Errors raised by the service layer.
///
/// The repository layer never produces `NotFound` or `Conflict`; it reports
/// absence as `None` and leaves the meaning to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No article or tag exists with the requested id.
    #[error("{0}")]
    NotFound(String),

    /// A tag with the requested name already exists.
    #[error("{0}")]
    Conflict(String),

    /// A database operation failed.
    #[error("catalog database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl CatalogError {
    pub(crate) fn article_not_found(id: i64) -> Self {
        Self::NotFound(format!("Article with id {id} not found"))
    }

    pub(crate) fn tag_not_found(id: i64) -> Self {
        Self::NotFound(format!("Tag with id {id} not found"))
    }

    pub(crate) fn duplicate_tag(name: &str) -> Self {
        Self::Conflict(format!("Tag with name `{name}` already exists"))
    }
}
