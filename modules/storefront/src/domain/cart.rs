use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use catalog::contract::{client::CatalogApi, error::CatalogApiError};

use crate::contract::model::Cart;
use crate::domain::error::StorefrontError;
use crate::infra::storage::{mapper, repo};

/// Domain service for the shopping cart. Book existence is checked through
/// the catalog contract client, not by reaching into catalog tables.
pub struct CartService {
    db: DatabaseConnection,
    catalog: Arc<dyn CatalogApi>,
}

impl CartService {
    pub fn new(db: DatabaseConnection, catalog: Arc<dyn CatalogApi>) -> Self {
        Self { db, catalog }
    }

    #[instrument(name = "storefront.cart.get", skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: Uuid) -> Result<Cart, StorefrontError> {
        debug!("Loading cart");

        let cart = repo::find_cart_by_user(&self.db, user_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
            .ok_or_else(|| StorefrontError::cart_not_found(user_id))?;
        let lines = repo::cart_lines(&self.db, cart.id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;
        Ok(mapper::to_cart(cart, lines))
    }

    /// Adds a book to the user's cart, creating the cart lazily. A repeat
    /// add of the same book increments the existing line's quantity.
    #[instrument(
        name = "storefront.cart.add_item",
        skip(self),
        fields(user_id = %user_id, book_id = %book_id)
    )]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, StorefrontError> {
        info!("Adding item to cart");

        self.catalog
            .get_book(book_id)
            .await
            .map_err(map_catalog_error)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;

        let cart = match repo::find_cart_by_user(&txn, user_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
        {
            Some(cart) => cart,
            None => repo::insert_cart(&txn, Uuid::new_v4(), user_id)
                .await
                .map_err(|e| StorefrontError::database(e.to_string()))?,
        };

        match repo::find_cart_line_by_book(&txn, cart.id, book_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
        {
            Some(line) => {
                repo::set_cart_line_quantity(&txn, line.id, line.quantity + quantity)
                    .await
                    .map_err(|e| StorefrontError::database(e.to_string()))?;
            }
            None => {
                repo::insert_cart_line(&txn, cart.id, book_id, quantity)
                    .await
                    .map_err(|e| StorefrontError::database(e.to_string()))?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;

        self.get_cart(user_id).await
    }

    /// Overwrites the line's quantity. Only lines of the caller's own live
    /// cart are reachable.
    #[instrument(
        name = "storefront.cart.update_line",
        skip(self),
        fields(user_id = %user_id, line_id = %line_id)
    )]
    pub async fn update_line_quantity(
        &self,
        user_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, StorefrontError> {
        info!("Updating cart line quantity");

        repo::find_cart_line_for_user(&self.db, user_id, line_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
            .ok_or_else(|| StorefrontError::cart_line_not_found(line_id))?;
        repo::set_cart_line_quantity(&self.db, line_id, quantity)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;

        self.get_cart(user_id).await
    }

    #[instrument(
        name = "storefront.cart.remove_line",
        skip(self),
        fields(user_id = %user_id, line_id = %line_id)
    )]
    pub async fn remove_line(&self, user_id: Uuid, line_id: Uuid) -> Result<(), StorefrontError> {
        info!("Removing cart line");

        repo::find_cart_line_for_user(&self.db, user_id, line_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
            .ok_or_else(|| StorefrontError::cart_line_not_found(line_id))?;
        repo::delete_cart_line(&self.db, line_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))
    }
}

fn map_catalog_error(err: CatalogApiError) -> StorefrontError {
    match err {
        CatalogApiError::BookNotFound { id } => StorefrontError::book_not_found(id),
        CatalogApiError::Internal => StorefrontError::database("catalog lookup failed"),
    }
}
