use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{client::CatalogApi, error::CatalogApiError, model::Book};
use crate::domain::{error::CatalogError, service::Service};

/// In-process implementation of the CatalogApi trait that delegates to the
/// domain service.
pub struct CatalogLocalClient {
    service: Arc<Service>,
}

impl CatalogLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CatalogApi for CatalogLocalClient {
    async fn get_book(&self, id: Uuid) -> Result<Book, CatalogApiError> {
        self.service.get_book(id).await.map_err(map_domain_error)
    }
}

fn map_domain_error(err: CatalogError) -> CatalogApiError {
    match err {
        CatalogError::BookNotFound { id } => CatalogApiError::book_not_found(id),
        _ => CatalogApiError::internal(),
    }
}
