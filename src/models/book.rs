//! Book model and admission rules for submitted book documents.
//!
//! A request body is checked in two passes that both always run, so every
//! violation is reported together:
//! - shape: each field is present and carries the right JSON type;
//! - content: strings are not blank and `pages` is not negative (`validator`).
//!
//! Fields that are not part of the book are ignored.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

/// Field names in storage and response order.
pub const BOOK_FIELDS: [&str; 8] = [
    "isbn",
    "amazon_url",
    "author",
    "language",
    "pages",
    "publisher",
    "title",
    "year",
];

/// A stored book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// ISBN, the primary key
    pub isbn: String,
    /// Amazon product page
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    /// Page count, never negative
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    /// Publication year
    pub year: i32,
}

/// Partially extracted candidate; `None` means the shape pass already rejected the field.
#[derive(Debug, Validate)]
struct BookDraft {
    #[validate(custom(function = "not_blank"))]
    isbn: Option<String>,
    #[validate(custom(function = "not_blank"))]
    amazon_url: Option<String>,
    #[validate(custom(function = "not_blank"))]
    author: Option<String>,
    #[validate(custom(function = "not_blank"))]
    language: Option<String>,
    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    pages: Option<i32>,
    #[validate(custom(function = "not_blank"))]
    publisher: Option<String>,
    #[validate(custom(function = "not_blank"))]
    title: Option<String>,
    year: Option<i32>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::from("must not be blank"));
        return Err(error);
    }
    Ok(())
}

fn field_rank(field: &str) -> usize {
    BOOK_FIELDS
        .iter()
        .position(|name| *name == field)
        .unwrap_or(BOOK_FIELDS.len())
}

fn string_field(object: &Map<String, Value>, field: &str) -> Result<String, String> {
    match object.get(field) {
        None | Some(Value::Null) => Err(format!("{field} is required")),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(format!("{field} must be a string")),
    }
}

fn integer_field(object: &Map<String, Value>, field: &str) -> Result<i32, String> {
    let value = match object.get(field) {
        None | Some(Value::Null) => return Err(format!("{field} is required")),
        Some(value) => value,
    };
    let number = value
        .as_i64()
        .ok_or_else(|| format!("{field} must be an integer"))?;
    i32::try_from(number).map_err(|_| format!("{field} is out of range"))
}

/// Keep the extracted value, or record the shape error under the field's rank.
fn admit<T>(field: &str, result: Result<T, String>, errors: &mut Vec<(usize, String)>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push((field_rank(field), message));
            None
        }
    }
}

/// Flatten `validator` output into `"<field> <message>"` lines, in field order.
fn content_messages(errors: &ValidationErrors) -> Vec<(usize, String)> {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        let field = field.to_string();
        let rank = field_rank(&field);
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            messages.push((rank, format!("{field} {message}")));
        }
    }
    messages
}

/// Check a candidate document and, if it is admissible, return it as a [`Book`].
///
/// On failure every violated rule yields one message, ordered by field.
pub fn validate(candidate: &Value) -> Result<Book, Vec<String>> {
    let Some(object) = candidate.as_object() else {
        return Err(vec!["book must be a JSON object".to_string()]);
    };

    let mut errors: Vec<(usize, String)> = Vec::new();
    let draft = BookDraft {
        isbn: admit("isbn", string_field(object, "isbn"), &mut errors),
        amazon_url: admit("amazon_url", string_field(object, "amazon_url"), &mut errors),
        author: admit("author", string_field(object, "author"), &mut errors),
        language: admit("language", string_field(object, "language"), &mut errors),
        pages: admit("pages", integer_field(object, "pages"), &mut errors),
        publisher: admit("publisher", string_field(object, "publisher"), &mut errors),
        title: admit("title", string_field(object, "title"), &mut errors),
        year: admit("year", integer_field(object, "year"), &mut errors),
    };

    if let Err(content) = draft.validate() {
        errors.extend(content_messages(&content));
    }

    if !errors.is_empty() {
        // Stable sort keeps a field's own messages in the order they were raised.
        errors.sort_by_key(|(rank, _)| *rank);
        return Err(errors.into_iter().map(|(_, message)| message).collect());
    }

    match draft {
        BookDraft {
            isbn: Some(isbn),
            amazon_url: Some(amazon_url),
            author: Some(author),
            language: Some(language),
            pages: Some(pages),
            publisher: Some(publisher),
            title: Some(title),
            year: Some(year),
        } => Ok(Book {
            isbn,
            amazon_url,
            author,
            language,
            pages,
            publisher,
            title,
            year,
        }),
        _ => Err(vec!["book is incomplete".to_string()]),
    }
}
