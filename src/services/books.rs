//! Book catalog service

use std::sync::Arc;

use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::book::{self, Book},
    repository::BookStore,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.store.list_all().await
    }

    pub async fn get(&self, isbn: &str) -> AppResult<Book> {
        self.store.get_by_isbn(isbn).await
    }

    /// Validate a submitted document and store it as a new book
    pub async fn create(&self, payload: &Value) -> AppResult<Book> {
        let candidate = admit(payload)?;
        let created = self.store.create(&candidate).await?;
        tracing::info!(isbn = %created.isbn, "book created");
        Ok(created)
    }

    /// Validate a full replacement document and overwrite the book at `isbn`.
    ///
    /// The path `isbn` locates the row; the document's own `isbn` only has to be valid.
    pub async fn replace(&self, isbn: &str, payload: &Value) -> AppResult<Book> {
        let candidate = admit(payload)?;
        if candidate.isbn != isbn {
            tracing::debug!(path = isbn, body = %candidate.isbn, "ignoring isbn in replacement body");
        }
        let updated = self.store.replace(isbn, &candidate).await?;
        tracing::info!(isbn = %updated.isbn, "book replaced");
        Ok(updated)
    }

    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        self.store.delete(isbn).await?;
        tracing::info!(isbn, "book deleted");
        Ok(())
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

fn admit(payload: &Value) -> AppResult<Book> {
    book::validate(payload).map_err(|messages| {
        tracing::debug!(violations = messages.len(), "book rejected");
        AppError::Validation(messages)
    })
}
