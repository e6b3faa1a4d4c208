//! Book instance queries on Repository

use async_trait::async_trait;

use super::{unknown_book, BookInstanceStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{BookInstance, BookInstanceData, RecordId},
};

const SELECT_WITH_TITLE: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.status, bi.due_back, b.title AS book_title
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
"#;

/// A `book_id` foreign key violation means the copy names a missing book
fn book_reference_error(e: sqlx::Error, book: &RecordId) -> AppError {
    match e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => unknown_book(book),
        other => other.into(),
    }
}

#[async_trait]
impl BookInstanceStore for Repository {
    async fn book_instance_list(&self) -> AppResult<Vec<BookInstance>> {
        let query = format!("{} ORDER BY b.title, bi.imprint", SELECT_WITH_TITLE);
        let rows = sqlx::query_as::<_, BookInstance>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn book_instance_get(&self, id: &RecordId) -> AppResult<Option<BookInstance>> {
        let query = format!("{} WHERE bi.id = $1", SELECT_WITH_TITLE);
        let row = sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn book_instance_create(&self, data: &BookInstanceData) -> AppResult<BookInstance> {
        let row = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, book_id, imprint, status, due_back
            "#,
        )
        .bind(RecordId::generate())
        .bind(&data.book)
        .bind(&data.imprint)
        .bind(data.status)
        .bind(data.due_back)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| book_reference_error(e, &data.book))?;
        Ok(row)
    }

    async fn book_instance_replace(
        &self,
        id: &RecordId,
        data: &BookInstanceData,
    ) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET book_id = $2, imprint = $3, status = $4, due_back = $5
            WHERE id = $1
            RETURNING id, book_id, imprint, status, due_back
            "#,
        )
        .bind(id)
        .bind(&data.book)
        .bind(&data.imprint)
        .bind(data.status)
        .bind(data.due_back)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| book_reference_error(e, &data.book))?;
        Ok(row)
    }

    async fn book_instance_delete(&self, id: &RecordId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
