//! Book persistence over the `books` table

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
};

/// Storage operations on books. Implementations own SQL shaping only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every stored book, ordered by title
    async fn list_all(&self) -> AppResult<Vec<Book>>;

    /// Exact match on the primary key
    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book>;

    /// Insert a new row; an existing `isbn` is a conflict
    async fn create(&self, book: &Book) -> AppResult<Book>;

    /// Overwrite every column of the row keyed by `isbn`.
    /// The `isbn` inside `book` is not used.
    async fn replace(&self, isbn: &str, book: &Book) -> AppResult<Book>;

    async fn delete(&self, isbn: &str) -> AppResult<()>;

    /// Round-trip to the backing store
    async fn ping(&self) -> AppResult<()>;
}

pub(crate) fn not_found(isbn: &str) -> AppError {
    AppError::NotFound(format!("There is no book with an isbn '{}'", isbn))
}

pub(crate) fn duplicate(isbn: &str) -> AppError {
    AppError::Conflict(format!("A book with isbn '{}' already exists", isbn))
}

/// PostgreSQL-backed book store
#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn list_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT isbn, amazon_url, author, language, pages, publisher, title, year
            FROM books
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT isbn, amazon_url, author, language, pages, publisher, title, year
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(isbn))
    }

    async fn create(&self, book: &Book) -> AppResult<Book> {
        // The primary key arbitrates concurrent creates; a skipped insert returns no row.
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (isbn) DO NOTHING
            RETURNING isbn, amazon_url, author, language, pages, publisher, title, year
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| duplicate(&book.isbn))
    }

    async fn replace(&self, isbn: &str, book: &Book) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET amazon_url = $2,
                author = $3,
                language = $4,
                pages = $5,
                publisher = $6,
                title = $7,
                year = $8
            WHERE isbn = $1
            RETURNING isbn, amazon_url, author, language, pages, publisher, title, year
            "#,
        )
        .bind(isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(isbn))
    }

    async fn delete(&self, isbn: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(isbn));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
