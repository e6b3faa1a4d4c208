//! HTTP handlers for the catalog pages

pub mod book_instances;
pub mod genres;
pub mod health;

use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::{error::AppResult, services::Outcome, AppState};

/// Send an operation outcome back to the client.
///
/// Redirects answer `303 See Other`, pages answer `200` with the rendered HTML.
pub(crate) fn respond(state: &AppState, outcome: Outcome) -> AppResult<Response> {
    match outcome {
        Outcome::Redirect(url) => Ok(Redirect::to(&url).into_response()),
        Outcome::Render(view) => {
            tracing::debug!("Rendering {}", view.template());
            let body = state.renderer.render(&view)?;
            Ok(Html(body).into_response())
        }
    }
}

/// Prefer the id posted in a hidden form field over the one in the path
pub(crate) fn target_id(posted: Option<String>, path_id: String) -> String {
    posted
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or(path_id)
}
