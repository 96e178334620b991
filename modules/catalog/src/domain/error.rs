use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Book with id {id} not found")]
    BookNotFound { id: Uuid },

    #[error("Category with id {id} not found")]
    CategoryNotFound { id: Uuid },

    #[error("Book with isbn '{isbn}' already exists")]
    IsbnAlreadyExists { isbn: String },

    /// A search field without a registered predicate provider. This is a
    /// configuration defect, not a user input error.
    #[error("No predicate provider registered for search field '{field}'")]
    UnknownSearchField { field: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl CatalogError {
    pub fn book_not_found(id: Uuid) -> Self {
        Self::BookNotFound { id }
    }

    pub fn category_not_found(id: Uuid) -> Self {
        Self::CategoryNotFound { id }
    }

    pub fn isbn_already_exists(isbn: impl Into<String>) -> Self {
        Self::IsbnAlreadyExists { isbn: isbn.into() }
    }

    pub fn unknown_search_field(field: impl Into<String>) -> Self {
        Self::UnknownSearchField {
            field: field.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
