//! Catalog Server
//!
//! Server-rendered pages for managing the genres and the physical copies
//! (book instances) of a library catalog.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub renderer: Arc<dyn views::Renderer>,
}

impl AppState {
    /// State over the given store with the HTML renderer
    pub fn new(config: AppConfig, store: Arc<dyn repository::CatalogStore>) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(store)),
            renderer: Arc::new(views::HtmlRenderer::new()),
        }
    }
}
