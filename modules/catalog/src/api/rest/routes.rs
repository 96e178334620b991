use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Builds the catalog router with the domain service injected as an
/// extension. Paths are relative to the server mount point.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            "/books",
            post(handlers::create_book)
                .get(handlers::list_books)
                .delete(handlers::delete_all_books),
        )
        .route("/books/search", get(handlers::search_books))
        .route(
            "/books/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .route(
            "/categories",
            post(handlers::create_category).get(handlers::list_categories),
        )
        .route(
            "/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route("/categories/{id}/books", get(handlers::books_by_category))
        .layer(Extension(service))
}
