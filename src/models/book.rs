//! Book model (read-only from the catalog handlers)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::RecordId;

/// Full book record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: RecordId,
    pub title: String,
    /// Author display name
    pub author: Option<String>,
    pub summary: String,
    pub isbn: String,
    /// Genres the book is filed under
    #[serde(default)]
    pub genres: Vec<RecordId>,
}

impl Book {
    pub fn to_summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

/// Book id and title, used for option lists and dependent-record listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookSummary {
    pub id: RecordId,
    pub title: String,
}

impl BookSummary {
    pub fn url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }
}
