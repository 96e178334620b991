use thiserror::Error;
use uuid::Uuid;

/// Errors exposed to other modules through the [`CatalogApi`] client.
///
/// [`CatalogApi`]: crate::contract::client::CatalogApi
#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error("Book with id {id} not found")]
    BookNotFound { id: Uuid },

    #[error("catalog internal error")]
    Internal,
}

impl CatalogApiError {
    pub fn book_not_found(id: Uuid) -> Self {
        Self::BookNotFound { id }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}
