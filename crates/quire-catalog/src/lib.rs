//! Articles and tags for quire.
//!
//! Plain data structs, repository functions over a borrowed
//! `rusqlite::Connection`, and the service layer that turns repository
//! results into transfer objects and domain errors.
//!
//! # Layers
//!
//! | Layer | Module | Errors |
//! |-------|--------|--------|
//! | Repository | [`repo::articles`], [`repo::tags`] | `rusqlite::Error`; absence is `None` |
//! | Validation | [`validation`] | [`ValidationErrors`] |
//! | Service | [`service::articles`], [`service::tags`] | [`CatalogError`] |
//!
//! Every service write runs in a single `IMMEDIATE` transaction, so an
//! article row and its `article_tag` rows commit together.
//!
//! # Usage
//!
//! ```rust,ignore
//! use quire_catalog::service::{articles, tags};
//!
//! let go = tags::create(&mut conn, "go")?;
//! let rust = tags::create(&mut conn, "rust")?;
//! let intro = articles::create(&mut conn, "Intro", &[go.id, rust.id])?;
//!
//! let filter = ["go".to_string()].into_iter().collect();
//! assert_eq!(articles::list(&conn, &filter)?, vec![intro]);
//! ```

mod error;
mod model;
pub mod repo;
pub mod service;
pub mod validation;
mod view;

pub use error::CatalogError;
pub use model::{Article, ArticleDraft, ArticleOrder, Tag, TagDraft};
pub use validation::{
    validate_article, validate_tag, ArticleForm, ArticleInput, TagForm, TagInput,
    ValidationErrors,
};
pub use view::{ArticleView, TagView};
