//! Data models for the catalog

pub mod book;
pub mod book_instance;
pub mod genre;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// Re-export commonly used types
pub use book::{Book, BookSummary};
pub use book_instance::{
    BookInstance, BookInstanceData, BookInstanceDraft, BookInstanceInput, BookInstanceStatus,
};
pub use genre::{Genre, GenreDeletion, GenreDraft, GenreInput, GenreWrite};

/// Opaque record identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Fresh identifier for a record about to be inserted
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
