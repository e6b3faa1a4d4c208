//! Page models and the renderer seam

pub mod html;

use crate::{
    error::AppResult,
    forms::FieldError,
    models::{BookInstance, BookInstanceDraft, BookInstanceStatus, BookSummary, Genre, GenreDraft},
};

pub use html::HtmlRenderer;

/// A page to render: template name plus its data
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    GenreList {
        genres: Vec<Genre>,
    },
    GenreDetail {
        genre: Genre,
        books: Vec<BookSummary>,
    },
    GenreForm {
        title: &'static str,
        genre: Option<GenreDraft>,
        errors: Vec<FieldError>,
    },
    GenreDelete {
        genre: Option<Genre>,
        books: Vec<BookSummary>,
    },
    BookInstanceList {
        instances: Vec<BookInstance>,
    },
    BookInstanceDetail {
        instance: BookInstance,
    },
    BookInstanceForm {
        title: &'static str,
        books: Vec<BookSummary>,
        selected_book: Option<String>,
        instance: Option<BookInstanceDraft>,
        statuses: &'static [BookInstanceStatus],
        errors: Vec<FieldError>,
    },
    BookInstanceDelete {
        instance: BookInstance,
    },
}

impl View {
    pub fn template(&self) -> &'static str {
        match self {
            View::GenreList { .. } => "genre_list",
            View::GenreDetail { .. } => "genre_detail",
            View::GenreForm { .. } => "genre_form",
            View::GenreDelete { .. } => "genre_delete",
            View::BookInstanceList { .. } => "bookinstance_list",
            View::BookInstanceDetail { .. } => "bookinstance_detail",
            View::BookInstanceForm { .. } => "bookinstance_form",
            View::BookInstanceDelete { .. } => "bookinstance_delete",
        }
    }

    pub fn title(&self) -> String {
        match self {
            View::GenreList { .. } => "Genre List".to_string(),
            View::GenreDetail { .. } => "Genre Detail".to_string(),
            View::GenreForm { title, .. } | View::BookInstanceForm { title, .. } => {
                title.to_string()
            }
            View::GenreDelete { .. } => "Delete Genre".to_string(),
            View::BookInstanceList { .. } => "Book Instance List".to_string(),
            View::BookInstanceDetail { instance } => format!(
                "Copy: {}",
                instance.book_title.as_deref().unwrap_or_default()
            ),
            View::BookInstanceDelete { .. } => "Delete BookInstance".to_string(),
        }
    }

    /// Field errors carried by a form view
    pub fn errors(&self) -> &[FieldError] {
        match self {
            View::GenreForm { errors, .. } | View::BookInstanceForm { errors, .. } => errors,
            _ => &[],
        }
    }
}

/// Turns a [`View`] into a response body
pub trait Renderer: Send + Sync {
    fn render(&self, view: &View) -> AppResult<String>;
}
