//! Genre service

use std::sync::Arc;

use super::Outcome;
use crate::{
    error::{AppError, AppResult},
    forms::{Pipeline, Submission},
    models::{GenreDeletion, GenreDraft, GenreInput, GenreWrite, RecordId},
    repository::CatalogStore,
    views::View,
};

pub const GENRE_LIST_URL: &str = "/catalog/genres";

const CREATE_TITLE: &str = "Create Genre";
const UPDATE_TITLE: &str = "Update Genre";

fn genre_form() -> Pipeline {
    Pipeline::new()
        .trim("name")
        .require("name", "Genre name required")
        .escape("name")
}

fn not_found() -> AppError {
    AppError::NotFound("Genre not found".to_string())
}

#[derive(Clone)]
pub struct GenreService {
    store: Arc<dyn CatalogStore>,
    form: Arc<Pipeline>,
}

impl GenreService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            form: Arc::new(genre_form()),
        }
    }

    fn sanitize(&self, input: GenreInput) -> Submission {
        self.form.run(Submission::new().with("name", input.name))
    }

    /// Cheap round trip to the store, used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.store.genre_get(&RecordId::from("")).await.map(|_| ())
    }

    /// All genres by name
    pub async fn list(&self) -> AppResult<Outcome> {
        let genres = self.store.genre_list().await?;
        Ok(Outcome::Render(View::GenreList { genres }))
    }

    /// A genre with the books filed under it
    pub async fn detail(&self, id: &RecordId) -> AppResult<Outcome> {
        let (genre, books) = tokio::try_join!(
            self.store.genre_get(id),
            self.store.book_list_by_genre(id)
        )?;
        let genre = genre.ok_or_else(not_found)?;
        Ok(Outcome::Render(View::GenreDetail { genre, books }))
    }

    pub fn create_form(&self) -> Outcome {
        Outcome::Render(View::GenreForm {
            title: CREATE_TITLE,
            genre: None,
            errors: Vec::new(),
        })
    }

    /// Create a genre, or send the client to the one already holding the name
    pub async fn create(&self, input: GenreInput) -> AppResult<Outcome> {
        let submission = self.sanitize(input);
        let draft = GenreDraft {
            id: None,
            name: submission.value("name").to_string(),
        };

        if !submission.is_valid() {
            return Ok(Outcome::Render(View::GenreForm {
                title: CREATE_TITLE,
                genre: Some(draft),
                errors: submission.into_errors(),
            }));
        }

        match self.store.genre_create_or_get(&draft.name).await? {
            GenreWrite::Saved(genre) => {
                tracing::info!("Created genre {} ({})", genre.id, genre.name);
                Ok(Outcome::redirect(genre.url()))
            }
            GenreWrite::Existing(genre) => {
                tracing::debug!("Genre {} already exists as {}", genre.name, genre.id);
                Ok(Outcome::redirect(genre.url()))
            }
        }
    }

    /// Confirmation page; a missing genre counts as already deleted
    pub async fn delete_form(&self, id: &RecordId) -> AppResult<Outcome> {
        let (genre, books) = tokio::try_join!(
            self.store.genre_get(id),
            self.store.book_list_by_genre(id)
        )?;
        match genre {
            None => Ok(Outcome::redirect(GENRE_LIST_URL)),
            Some(genre) => Ok(Outcome::Render(View::GenreDelete {
                genre: Some(genre),
                books,
            })),
        }
    }

    /// Delete a genre unless books still reference it
    pub async fn delete(&self, id: &RecordId) -> AppResult<Outcome> {
        let (genre, books) = tokio::try_join!(
            self.store.genre_get(id),
            self.store.book_list_by_genre(id)
        )?;

        if !books.is_empty() {
            tracing::info!("Refusing to delete genre {}: {} book(s) reference it", id, books.len());
            return Ok(Outcome::Render(View::GenreDelete { genre, books }));
        }

        match self.store.genre_delete_unreferenced(id).await? {
            GenreDeletion::Deleted => tracing::info!("Deleted genre {}", id),
            GenreDeletion::Missing => tracing::debug!("Genre {} was already gone", id),
            GenreDeletion::Referenced => {
                // A book was filed under the genre after the check above
                let books = self.store.book_list_by_genre(id).await?;
                tracing::warn!("Genre {} gained references during delete", id);
                return Ok(Outcome::Render(View::GenreDelete { genre, books }));
            }
        }
        Ok(Outcome::redirect(GENRE_LIST_URL))
    }

    pub async fn update_form(&self, id: &RecordId) -> AppResult<Outcome> {
        let genre = self.store.genre_get(id).await?.ok_or_else(not_found)?;
        Ok(Outcome::Render(View::GenreForm {
            title: UPDATE_TITLE,
            genre: Some(GenreDraft::from(&genre)),
            errors: Vec::new(),
        }))
    }

    /// Rename a genre; a name held by another genre sends the client there
    /// and leaves this one untouched
    pub async fn update(&self, id: &RecordId, input: GenreInput) -> AppResult<Outcome> {
        let submission = self.sanitize(input);
        let draft = GenreDraft {
            id: Some(id.clone()),
            name: submission.value("name").to_string(),
        };

        if !submission.is_valid() {
            return Ok(Outcome::Render(View::GenreForm {
                title: UPDATE_TITLE,
                genre: Some(draft),
                errors: submission.into_errors(),
            }));
        }

        match self.store.genre_rename(id, &draft.name).await? {
            None => Err(not_found()),
            Some(GenreWrite::Saved(genre)) => {
                tracing::info!("Updated genre {} ({})", genre.id, genre.name);
                Ok(Outcome::redirect(genre.url()))
            }
            Some(GenreWrite::Existing(genre)) => {
                tracing::info!(
                    "Genre {} not renamed: {} already belongs to {}",
                    id,
                    genre.name,
                    genre.id
                );
                Ok(Outcome::redirect(genre.url()))
            }
        }
    }
}
