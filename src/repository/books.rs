//! Book queries on Repository

use async_trait::async_trait;

use super::{BookStore, Repository};
use crate::{
    error::AppResult,
    models::{BookSummary, RecordId},
};

#[async_trait]
impl BookStore for Repository {
    async fn book_list_summaries(&self) -> AppResult<Vec<BookSummary>> {
        let rows = sqlx::query_as::<_, BookSummary>("SELECT id, title FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn book_list_by_genre(&self, genre_id: &RecordId) -> AppResult<Vec<BookSummary>> {
        let rows = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title
            FROM books b
            JOIN book_genres bg ON bg.book_id = b.id
            WHERE bg.genre_id = $1
            ORDER BY b.title
            "#,
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
