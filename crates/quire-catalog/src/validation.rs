//! Request validation for article and tag payloads.
//!
//! Validation is a pure function from the raw form to a validated input,
//! collecting every field error rather than stopping at the first one.
//! Form fields hold raw JSON so a wrongly typed field is reported against
//! that field instead of failing the whole body.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum article title length, in characters.
pub const MAX_TITLE_CHARS: usize = 100;
/// Maximum tag name length, in characters.
pub const MAX_TAG_NAME_CHARS: usize = 50;

const BLANK: &str = "This value should not be blank.";
const INVALID: &str = "This value is not valid.";

/// Raw article payload as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleForm {
    /// Expected to be a string.
    pub title: Option<Value>,
    /// Expected to be an array of tag ids. Absent or `null` means no tags.
    pub tags: Option<Value>,
}

/// Validated article payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleInput {
    pub title: String,
    pub tag_ids: Vec<i64>,
}

/// Raw tag payload as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagForm {
    /// Expected to be a string.
    pub name: Option<Value>,
}

/// Validated tag payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInput {
    pub name: String,
}

/// Field name to error messages, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} invalid field(s)", .0.len())]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Validates an article payload: `title` is required, non-blank and at most
/// [`MAX_TITLE_CHARS`] characters; `tags` is a list of integer ids (numeric
/// strings accepted) and defaults to empty.
pub fn validate_article(form: ArticleForm) -> Result<ArticleInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = required_text(&mut errors, "title", form.title, MAX_TITLE_CHARS);
    let tag_ids = tag_ids(&mut errors, form.tags);

    match (title, tag_ids) {
        (Some(title), Some(tag_ids)) => Ok(ArticleInput { title, tag_ids }),
        _ => Err(errors),
    }
}

/// Validates a tag payload: `name` is required, non-blank and at most
/// [`MAX_TAG_NAME_CHARS`] characters.
pub fn validate_tag(form: TagForm) -> Result<TagInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    match required_text(&mut errors, "name", form.name, MAX_TAG_NAME_CHARS) {
        Some(name) => Ok(TagInput { name }),
        None => Err(errors),
    }
}

/// Trims `raw` and checks it against the type, blank and length rules.
/// Returns the trimmed value when valid, recording an error otherwise.
fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<Value>,
    max_chars: usize,
) -> Option<String> {
    let text = match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(_) => {
            errors.add(field, INVALID);
            return None;
        }
    };
    let value = text.trim();

    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("This value is too long. It should have {max_chars} characters or less."),
        );
        return None;
    }

    Some(value.to_string())
}

fn tag_ids(errors: &mut ValidationErrors, raw: Option<Value>) -> Option<Vec<i64>> {
    let ids = match raw {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(tag_id).collect(),
        Some(_) => None,
    };
    if ids.is_none() {
        errors.add("tags", INVALID);
    }
    ids
}

fn tag_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article_form(title: Option<&str>, tags: Option<Vec<i64>>) -> ArticleForm {
        ArticleForm {
            title: title.map(Value::from),
            tags: tags.map(Value::from),
        }
    }

    #[test]
    fn article_with_title_and_tags_is_valid() {
        let input = validate_article(article_form(Some("  Intro "), Some(vec![2, 1])))
            .expect("form should be valid");
        assert_eq!(input.title, "Intro");
        assert_eq!(input.tag_ids, vec![2, 1]);
    }

    #[test]
    fn article_tags_default_to_empty() {
        let input = validate_article(article_form(Some("Intro"), None)).expect("valid");
        assert!(input.tag_ids.is_empty());
    }

    #[test]
    fn missing_or_blank_title_is_rejected() {
        for title in [None, Some(""), Some("   ")] {
            let errors = validate_article(article_form(title, None))
                .expect_err("blank title should be rejected");
            assert_eq!(errors.field("title"), [BLANK.to_string()]);
        }
    }

    #[test]
    fn title_length_counts_characters() {
        let at_limit = "é".repeat(MAX_TITLE_CHARS);
        assert!(validate_article(article_form(Some(&at_limit), None)).is_ok());

        let over = "a".repeat(MAX_TITLE_CHARS + 1);
        let errors = validate_article(article_form(Some(&over), None))
            .expect_err("long title should be rejected");
        assert_eq!(
            errors.field("title"),
            ["This value is too long. It should have 100 characters or less.".to_string()]
        );
    }

    #[test]
    fn tag_name_over_fifty_characters_is_rejected() {
        let errors = validate_tag(TagForm {
            name: Some(Value::from("n".repeat(MAX_TAG_NAME_CHARS + 1))),
        })
        .expect_err("long name should be rejected");
        assert_eq!(errors.field("name").len(), 1);
        assert!(errors.field("title").is_empty());

        let ok = validate_tag(TagForm {
            name: Some(Value::from("n".repeat(MAX_TAG_NAME_CHARS))),
        })
        .expect("name at the limit should be valid");
        assert_eq!(ok.name.len(), MAX_TAG_NAME_CHARS);
    }

    #[test]
    fn errors_serialize_as_field_map() {
        let errors = validate_tag(TagForm::default()).expect_err("missing name");
        let json = serde_json::to_value(&errors).expect("should serialize");
        assert_eq!(json, serde_json::json!({ "name": [BLANK] }));
    }

    #[test]
    fn wrongly_typed_fields_are_reported_per_field() {
        let form = ArticleForm {
            title: Some(json!(5)),
            tags: Some(json!("1")),
        };
        let errors = validate_article(form).expect_err("typed fields should be rejected");
        assert_eq!(errors.field("title"), [INVALID.to_string()]);
        assert_eq!(errors.field("tags"), [INVALID.to_string()]);

        let errors = validate_tag(TagForm {
            name: Some(json!(["rust"])),
        })
        .expect_err("array name should be rejected");
        assert_eq!(errors.field("name"), [INVALID.to_string()]);
    }

    #[test]
    fn tag_ids_must_all_be_integers() {
        let form = ArticleForm {
            title: Some(json!("Intro")),
            tags: Some(json!([1, "one"])),
        };
        let errors = validate_article(form).expect_err("non-numeric id should be rejected");
        assert_eq!(errors.field("tags"), [INVALID.to_string()]);
        assert!(errors.field("title").is_empty());

        let form = ArticleForm {
            title: Some(json!("Intro")),
            tags: Some(json!([3, " 2 ", 1.5])),
        };
        assert!(validate_article(form).is_err(), "fractional id is not an id");

        let form = ArticleForm {
            title: Some(json!("Intro")),
            tags: Some(json!([3, "2"])),
        };
        let input = validate_article(form).expect("numeric strings are ids");
        assert_eq!(input.tag_ids, vec![3, 2]);
    }

    #[test]
    fn null_fields_count_as_absent() {
        let form = ArticleForm {
            title: Some(Value::Null),
            tags: Some(Value::Null),
        };
        let errors = validate_article(form).expect_err("null title is blank");
        assert_eq!(errors.field("title"), [BLANK.to_string()]);
        assert!(errors.field("tags").is_empty());
    }
}
