use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::error::CatalogApiError;
use crate::contract::model::Book;

/// Catalog lookups consumed by other modules (storefront resolves books
/// through this when adding items to a cart).
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn get_book(&self, id: Uuid) -> Result<Book, CatalogApiError>;
}
