use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Cart for user {user_id} not found")]
    CartNotFound { user_id: Uuid },

    #[error("Cart line with id {id} not found")]
    CartLineNotFound { id: Uuid },

    #[error("Book with id {id} not found")]
    BookNotFound { id: Uuid },

    #[error("Order with id {id} not found")]
    OrderNotFound { id: Uuid },

    #[error("Order line with id {id} not found")]
    OrderLineNotFound { id: Uuid },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl StorefrontError {
    pub fn cart_not_found(user_id: Uuid) -> Self {
        Self::CartNotFound { user_id }
    }

    pub fn cart_line_not_found(id: Uuid) -> Self {
        Self::CartLineNotFound { id }
    }

    pub fn book_not_found(id: Uuid) -> Self {
        Self::BookNotFound { id }
    }

    pub fn order_not_found(id: Uuid) -> Self {
        Self::OrderNotFound { id }
    }

    pub fn order_line_not_found(id: Uuid) -> Self {
        Self::OrderLineNotFound { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
