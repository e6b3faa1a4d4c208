//! Genre pages

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use serde::Deserialize;

use super::{respond, target_id};
use crate::{
    error::AppResult,
    models::{GenreInput, RecordId},
    AppState,
};

/// Body of the delete confirmation form
#[derive(Debug, Default, Deserialize)]
pub struct GenreDeleteForm {
    #[serde(default)]
    pub genreid: Option<String>,
}

pub async fn list_genres(State(state): State<AppState>) -> AppResult<Response> {
    let outcome = state.services.genres.list().await?;
    respond(&state, outcome)
}

pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state.services.genres.detail(&RecordId::from(id)).await?;
    respond(&state, outcome)
}

pub async fn create_genre_form(State(state): State<AppState>) -> AppResult<Response> {
    let outcome = state.services.genres.create_form();
    respond(&state, outcome)
}

pub async fn create_genre(
    State(state): State<AppState>,
    Form(input): Form<GenreInput>,
) -> AppResult<Response> {
    let outcome = state.services.genres.create(input).await?;
    respond(&state, outcome)
}

pub async fn delete_genre_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state.services.genres.delete_form(&RecordId::from(id)).await?;
    respond(&state, outcome)
}

pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<GenreDeleteForm>,
) -> AppResult<Response> {
    let id = RecordId::from(target_id(form.genreid, id));
    let outcome = state.services.genres.delete(&id).await?;
    respond(&state, outcome)
}

pub async fn update_genre_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state.services.genres.update_form(&RecordId::from(id)).await?;
    respond(&state, outcome)
}

pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(input): Form<GenreInput>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .genres
        .update(&RecordId::from(id), input)
        .await?;
    respond(&state, outcome)
}
