//! Book instance service

use chrono::NaiveDate;
use std::sync::Arc;

use super::Outcome;
use crate::{
    error::{AppError, AppResult},
    forms::{FieldError, Pipeline, Submission},
    models::{
        BookInstanceData, BookInstanceDraft, BookInstanceInput, BookInstanceStatus, RecordId,
    },
    repository::CatalogStore,
    views::View,
};

pub const BOOK_INSTANCE_LIST_URL: &str = "/catalog/bookinstances";

const CREATE_TITLE: &str = "Create BookInstance";
const UPDATE_TITLE: &str = "Update BookInstance";

fn book_instance_form() -> Pipeline {
    Pipeline::new()
        .trim("book")
        .require("book", "Book must be specified")
        .trim("imprint")
        .require("imprint", "Imprint must be specified")
        .trim("due_back")
        .optional_date("due_back", "Invalid date")
        .escape("due_back")
        .escape("book")
        .escape("imprint")
        .trim("status")
        .escape("status")
        .one_of("status", BookInstanceStatus::VALUES, "Invalid status")
        .to_date("due_back")
}

impl BookInstanceDraft {
    fn from_submission(id: Option<RecordId>, submission: &Submission) -> Self {
        Self {
            id,
            book: submission.value("book").to_string(),
            imprint: submission.value("imprint").to_string(),
            status: submission.value("status").to_string(),
            due_back: submission.value("due_back").to_string(),
        }
    }

    /// Field values to store; only meaningful once the submission validated
    fn to_data(&self) -> BookInstanceData {
        BookInstanceData {
            book: RecordId::from(self.book.as_str()),
            imprint: self.imprint.clone(),
            status: self.status.parse().unwrap_or_default(),
            due_back: NaiveDate::parse_from_str(&self.due_back, "%Y-%m-%d").ok(),
        }
    }
}

#[derive(Clone)]
pub struct BookInstanceService {
    store: Arc<dyn CatalogStore>,
    form: Arc<Pipeline>,
}

impl BookInstanceService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            form: Arc::new(book_instance_form()),
        }
    }

    fn sanitize(&self, input: BookInstanceInput) -> Submission {
        self.form.run(
            Submission::new()
                .with("book", input.book)
                .with("imprint", input.imprint)
                .with("status", input.status)
                .with("due_back", input.due_back),
        )
    }

    /// Form page with the book choices loaded from the store
    async fn form_view(
        &self,
        title: &'static str,
        draft: Option<BookInstanceDraft>,
        errors: Vec<FieldError>,
    ) -> AppResult<Outcome> {
        let books = self.store.book_list_summaries().await?;
        let selected_book = draft
            .as_ref()
            .map(|d| d.book.clone())
            .filter(|book| !book.is_empty());
        Ok(Outcome::Render(View::BookInstanceForm {
            title,
            books,
            selected_book,
            instance: draft,
            statuses: &BookInstanceStatus::ALL,
            errors,
        }))
    }

    /// All copies with their book titles
    pub async fn list(&self) -> AppResult<Outcome> {
        let instances = self.store.book_instance_list().await?;
        Ok(Outcome::Render(View::BookInstanceList { instances }))
    }

    pub async fn detail(&self, id: &RecordId) -> AppResult<Outcome> {
        let instance = self
            .store
            .book_instance_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book copy not found".to_string()))?;
        Ok(Outcome::Render(View::BookInstanceDetail { instance }))
    }

    pub async fn create_form(&self) -> AppResult<Outcome> {
        self.form_view(CREATE_TITLE, None, Vec::new()).await
    }

    pub async fn create(&self, input: BookInstanceInput) -> AppResult<Outcome> {
        let submission = self.sanitize(input);
        let draft = BookInstanceDraft::from_submission(None, &submission);

        if !submission.is_valid() {
            return self
                .form_view(CREATE_TITLE, Some(draft), submission.into_errors())
                .await;
        }

        let instance = self.store.book_instance_create(&draft.to_data()).await?;
        tracing::info!("Created book instance {} of book {}", instance.id, instance.book);
        Ok(Outcome::redirect(instance.url()))
    }

    /// Confirmation page; a missing copy counts as already deleted
    pub async fn delete_form(&self, id: &RecordId) -> AppResult<Outcome> {
        match self.store.book_instance_get(id).await? {
            None => Ok(Outcome::redirect(BOOK_INSTANCE_LIST_URL)),
            Some(instance) => Ok(Outcome::Render(View::BookInstanceDelete { instance })),
        }
    }

    pub async fn delete(&self, id: &RecordId) -> AppResult<Outcome> {
        if self.store.book_instance_delete(id).await? {
            tracing::info!("Deleted book instance {}", id);
        } else {
            tracing::debug!("Book instance {} was already gone", id);
        }
        Ok(Outcome::redirect(BOOK_INSTANCE_LIST_URL))
    }

    pub async fn update_form(&self, id: &RecordId) -> AppResult<Outcome> {
        let (instance, books) = tokio::try_join!(
            self.store.book_instance_get(id),
            self.store.book_list_summaries()
        )?;
        let instance =
            instance.ok_or_else(|| AppError::NotFound("BookInstance not found".to_string()))?;
        let draft = BookInstanceDraft::from(&instance);

        Ok(Outcome::Render(View::BookInstanceForm {
            title: UPDATE_TITLE,
            books,
            selected_book: Some(instance.book.to_string()),
            instance: Some(draft),
            statuses: &BookInstanceStatus::ALL,
            errors: Vec::new(),
        }))
    }

    /// Replace every field of an existing copy, keeping its id
    pub async fn update(&self, id: &RecordId, input: BookInstanceInput) -> AppResult<Outcome> {
        let submission = self.sanitize(input);
        let draft = BookInstanceDraft::from_submission(Some(id.clone()), &submission);

        if !submission.is_valid() {
            return self
                .form_view(UPDATE_TITLE, Some(draft), submission.into_errors())
                .await;
        }

        let instance = self
            .store
            .book_instance_replace(id, &draft.to_data())
            .await?
            .ok_or_else(|| AppError::NotFound("BookInstance not found".to_string()))?;
        tracing::info!("Updated book instance {}", instance.id);
        Ok(Outcome::redirect(instance.url()))
    }
}
