//! Router assembly

use axum::{
    response::Redirect,
    routing::get,
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{api, AppState};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let catalog = Router::new()
        // Genres
        .route("/genres", get(api::genres::list_genres))
        .route(
            "/genre/create",
            get(api::genres::create_genre_form).post(api::genres::create_genre),
        )
        .route("/genre/:id", get(api::genres::get_genre))
        .route(
            "/genre/:id/delete",
            get(api::genres::delete_genre_form).post(api::genres::delete_genre),
        )
        .route(
            "/genre/:id/update",
            get(api::genres::update_genre_form).post(api::genres::update_genre),
        )
        // Book instances
        .route("/bookinstances", get(api::book_instances::list_book_instances))
        .route(
            "/bookinstance/create",
            get(api::book_instances::create_book_instance_form)
                .post(api::book_instances::create_book_instance),
        )
        .route("/bookinstance/:id", get(api::book_instances::get_book_instance))
        .route(
            "/bookinstance/:id/delete",
            get(api::book_instances::delete_book_instance_form)
                .post(api::book_instances::delete_book_instance),
        )
        .route(
            "/bookinstance/:id/update",
            get(api::book_instances::update_book_instance_form)
                .post(api::book_instances::update_book_instance),
        );

    Router::new()
        .route("/", get(|| async { Redirect::to("/catalog/genres") }))
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        .nest("/catalog", catalog)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
}
