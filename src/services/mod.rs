//! Request handling logic for the catalog
//!
//! Every operation answers with an [`Outcome`] or an error; the HTTP layer
//! decides how each is sent back.

pub mod book_instances;
pub mod genres;

use std::sync::Arc;

use crate::{repository::CatalogStore, views::View};

/// Terminal result of a catalog operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Render a page
    Render(View),
    /// Send the client to another URL
    Redirect(String),
}

impl Outcome {
    pub fn redirect(url: impl Into<String>) -> Self {
        Outcome::Redirect(url.into())
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub genres: genres::GenreService,
    pub book_instances: book_instances::BookInstanceService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            genres: genres::GenreService::new(store.clone()),
            book_instances: book_instances::BookInstanceService::new(store),
        }
    }
}
