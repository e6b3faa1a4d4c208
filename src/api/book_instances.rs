//! Book instance pages

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use serde::Deserialize;

use super::{respond, target_id};
use crate::{
    error::AppResult,
    models::{BookInstanceInput, RecordId},
    AppState,
};

/// Body of the delete confirmation form
#[derive(Debug, Default, Deserialize)]
pub struct BookInstanceDeleteForm {
    #[serde(default)]
    pub bookinstanceid: Option<String>,
}

pub async fn list_book_instances(State(state): State<AppState>) -> AppResult<Response> {
    let outcome = state.services.book_instances.list().await?;
    respond(&state, outcome)
}

pub async fn get_book_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .book_instances
        .detail(&RecordId::from(id))
        .await?;
    respond(&state, outcome)
}

pub async fn create_book_instance_form(State(state): State<AppState>) -> AppResult<Response> {
    let outcome = state.services.book_instances.create_form().await?;
    respond(&state, outcome)
}

pub async fn create_book_instance(
    State(state): State<AppState>,
    Form(input): Form<BookInstanceInput>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.create(input).await?;
    respond(&state, outcome)
}

pub async fn delete_book_instance_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .book_instances
        .delete_form(&RecordId::from(id))
        .await?;
    respond(&state, outcome)
}

pub async fn delete_book_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<BookInstanceDeleteForm>,
) -> AppResult<Response> {
    let id = RecordId::from(target_id(form.bookinstanceid, id));
    let outcome = state.services.book_instances.delete(&id).await?;
    respond(&state, outcome)
}

pub async fn update_book_instance_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .book_instances
        .update_form(&RecordId::from(id))
        .await?;
    respond(&state, outcome)
}

pub async fn update_book_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(input): Form<BookInstanceInput>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .book_instances
        .update(&RecordId::from(id), input)
        .await?;
    respond(&state, outcome)
}
