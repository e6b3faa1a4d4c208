//! Repository layer for catalog records
//!
//! The store traits are the only way services reach persisted data. A missing
//! record is `Ok(None)` (or a dedicated variant), never an error.

pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
    models::{
        BookInstance, BookInstanceData, BookSummary, Genre, GenreDeletion, GenreWrite, RecordId,
    },
};

pub use memory::MemoryStore;

/// Read access to books, which are owned outside the catalog handlers
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books (id and title), ordered by title
    async fn book_list_summaries(&self) -> AppResult<Vec<BookSummary>>;

    /// Books filed under a genre, ordered by title
    async fn book_list_by_genre(&self, genre_id: &RecordId) -> AppResult<Vec<BookSummary>>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    /// All genres ordered by name
    async fn genre_list(&self) -> AppResult<Vec<Genre>>;

    async fn genre_get(&self, id: &RecordId) -> AppResult<Option<Genre>>;

    /// Insert a genre unless one with the same name exists, atomically
    async fn genre_create_or_get(&self, name: &str) -> AppResult<GenreWrite>;

    /// Rename a genre unless another genre holds the name.
    /// `None` when no genre has this id.
    async fn genre_rename(&self, id: &RecordId, name: &str) -> AppResult<Option<GenreWrite>>;

    /// Delete a genre only if no book references it
    async fn genre_delete_unreferenced(&self, id: &RecordId) -> AppResult<GenreDeletion>;
}

#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    /// All copies joined with their book title
    async fn book_instance_list(&self) -> AppResult<Vec<BookInstance>>;

    /// One copy joined with its book title
    async fn book_instance_get(&self, id: &RecordId) -> AppResult<Option<BookInstance>>;

    async fn book_instance_create(&self, data: &BookInstanceData) -> AppResult<BookInstance>;

    /// Overwrite every field of a copy. `None` when no copy has this id.
    async fn book_instance_replace(
        &self,
        id: &RecordId,
        data: &BookInstanceData,
    ) -> AppResult<Option<BookInstance>>;

    /// Returns whether a copy was removed
    async fn book_instance_delete(&self, id: &RecordId) -> AppResult<bool>;
}

/// Rejection for a copy naming a book that does not exist
pub(crate) fn unknown_book(id: &RecordId) -> AppError {
    AppError::BadRequest(format!("Book {} does not exist", id))
}

/// Everything the catalog services need from a store
pub trait CatalogStore: BookStore + GenreStore + BookInstanceStore {}

impl<T: BookStore + GenreStore + BookInstanceStore> CatalogStore for T {}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
