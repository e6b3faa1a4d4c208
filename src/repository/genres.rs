//! Genre queries on Repository
//!
//! Name uniqueness rests on the `genres_name_key` unique index and the delete
//! guard on the `book_genres` foreign key, so neither depends on a prior read.

use async_trait::async_trait;

use super::{GenreStore, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{Genre, GenreDeletion, GenreWrite, RecordId},
};

impl Repository {
    async fn genre_get_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn genre_holding_name(&self, name: &str) -> AppResult<Genre> {
        self.genre_get_by_name(name)
            .await?
            .ok_or_else(|| AppError::Store(format!("Genre {} vanished after name conflict", name)))
    }
}

#[async_trait]
impl GenreStore for Repository {
    async fn genre_list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn genre_get(&self, id: &RecordId) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn genre_create_or_get(&self, name: &str) -> AppResult<GenreWrite> {
        let inserted = sqlx::query_as::<_, Genre>(
            r#"
            INSERT INTO genres (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name
            "#,
        )
        .bind(RecordId::generate())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(genre) => Ok(GenreWrite::Saved(genre)),
            None => Ok(GenreWrite::Existing(self.genre_holding_name(name).await?)),
        }
    }

    async fn genre_rename(&self, id: &RecordId, name: &str) -> AppResult<Option<GenreWrite>> {
        if let Some(existing) = self.genre_get_by_name(name).await? {
            if &existing.id != id {
                return Ok(Some(GenreWrite::Existing(existing)));
            }
        }

        let updated = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await;

        match updated {
            Ok(row) => Ok(row.map(GenreWrite::Saved)),
            // Another request took the name between the lookup and the update
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(Some(GenreWrite::Existing(self.genre_holding_name(name).await?)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn genre_delete_unreferenced(&self, id: &RecordId) -> AppResult<GenreDeletion> {
        let result = sqlx::query(
            r#"
            DELETE FROM genres
            WHERE id = $1
              AND NOT EXISTS (SELECT 1 FROM book_genres WHERE genre_id = $1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(GenreDeletion::Deleted),
            Ok(_) => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM genres WHERE id = $1)")
                        .bind(id)
                        .fetch_one(&self.pool)
                        .await?;
                Ok(if exists {
                    GenreDeletion::Referenced
                } else {
                    GenreDeletion::Missing
                })
            }
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Ok(GenreDeletion::Referenced)
            }
            Err(e) => Err(e.into()),
        }
    }
}
