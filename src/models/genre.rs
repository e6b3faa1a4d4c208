//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::RecordId;

/// Genre record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: RecordId,
    /// Unique genre name, stored HTML-escaped
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

/// Raw genre form submission
#[derive(Debug, Default, Clone, Deserialize)]
pub struct GenreInput {
    #[serde(default)]
    pub name: String,
}

/// Sanitized form values, echoed back when the form is re-rendered
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenreDraft {
    /// Target record when editing an existing genre
    pub id: Option<RecordId>,
    pub name: String,
}

impl From<&Genre> for GenreDraft {
    fn from(genre: &Genre) -> Self {
        Self {
            id: Some(genre.id.clone()),
            name: genre.name.clone(),
        }
    }
}

/// Result of a name-keyed genre write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreWrite {
    /// The write was applied
    Saved(Genre),
    /// Another genre already holds the name; nothing was written
    Existing(Genre),
}

impl GenreWrite {
    /// The genre the client should be sent to
    pub fn genre(&self) -> &Genre {
        match self {
            GenreWrite::Saved(g) | GenreWrite::Existing(g) => g,
        }
    }
}

/// Result of a guarded genre delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreDeletion {
    Deleted,
    /// No genre with that id
    Missing,
    /// At least one book still references the genre
    Referenced,
}
