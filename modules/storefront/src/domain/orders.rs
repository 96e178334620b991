use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use catalog::infra::storage::repo as catalog_repo;

use crate::contract::model::{Order, OrderStatus, PlaceOrderRequest};
use crate::domain::error::StorefrontError;
use crate::infra::storage::entity::{order_items, orders};
use crate::infra::storage::{mapper, repo};

/// Domain service for checkout and order reads.
///
/// Checkout is serialized per user through an in-process advisory lock so
/// two concurrent requests cannot both consume the same cart. A
/// multi-instance deployment would need a database-level guard instead.
pub struct OrderService {
    db: DatabaseConnection,
    checkout_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl OrderService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            checkout_locks: DashMap::new(),
        }
    }

    fn checkout_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.checkout_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Converts the user's cart into an order in one transaction.
    ///
    /// A Pending order, if it is the user's most recent one, accumulates the
    /// new lines; otherwise a fresh Pending order is created. Each order
    /// line snapshots the book's current price. The cart is consumed: its
    /// row is soft-deleted and its lines are removed.
    #[instrument(name = "storefront.orders.place", skip(self, request), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: Uuid,
        request: PlaceOrderRequest,
    ) -> Result<Order, StorefrontError> {
        info!("Placing order");

        let lock = self.checkout_lock(user_id);
        let _guard = lock.lock().await;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;

        let cart = repo::find_cart_by_user(&txn, user_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
            .ok_or_else(|| StorefrontError::cart_not_found(user_id))?;
        let cart_lines = repo::cart_lines(&txn, cart.id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;

        let latest = repo::latest_order_for_user(&txn, user_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;
        let order = match latest {
            Some(order) if order.status == OrderStatus::Pending.as_str() => order,
            _ => {
                let order = orders::Model {
                    id: Uuid::new_v4(),
                    user_id,
                    status: OrderStatus::Pending.as_str().to_string(),
                    shipping_address: request.shipping_address,
                    total: Decimal::ZERO,
                    placed_at: Utc::now(),
                };
                repo::insert_order(&txn, &order)
                    .await
                    .map_err(|e| StorefrontError::database(e.to_string()))?;
                order
            }
        };

        let mut total = order.total;
        for line in &cart_lines {
            let book = catalog_repo::find_book(&txn, line.book_id)
                .await
                .map_err(|e| StorefrontError::database(e.to_string()))?
                .ok_or_else(|| StorefrontError::book_not_found(line.book_id))?;

            let order_line = order_items::Model {
                id: Uuid::new_v4(),
                order_id: order.id,
                book_id: line.book_id,
                quantity: line.quantity,
                unit_price: book.price,
            };
            repo::insert_order_line(&txn, &order_line)
                .await
                .map_err(|e| StorefrontError::database(e.to_string()))?;
            total += book.price * Decimal::from(line.quantity);
        }

        repo::set_order_total(&txn, order.id, total)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;
        repo::delete_cart_lines(&txn, cart.id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;
        repo::soft_delete_cart(&txn, cart.id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;

        let lines = repo::order_lines(&txn, order.id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;

        info!("Placed order id={} total={}", order.id, total);
        mapper::to_order(orders::Model { total, ..order }, lines)
    }

    #[instrument(name = "storefront.orders.list", skip(self), fields(user_id = %user_id))]
    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>, StorefrontError> {
        debug!("Listing orders");

        let rows = repo::orders_for_user(&self.db, user_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = repo::order_lines(&self.db, row.id)
                .await
                .map_err(|e| StorefrontError::database(e.to_string()))?;
            result.push(mapper::to_order(row, lines)?);
        }
        Ok(result)
    }

    /// Lines of one order, scoped to the requesting user. A foreign order is
    /// indistinguishable from a missing one.
    #[instrument(
        name = "storefront.orders.lines",
        skip(self),
        fields(user_id = %user_id, order_id = %order_id)
    )]
    pub async fn order_lines(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Vec<crate::contract::model::OrderLine>, StorefrontError> {
        repo::find_order_for_user(&self.db, user_id, order_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
            .ok_or_else(|| StorefrontError::order_not_found(order_id))?;

        let lines = repo::order_lines(&self.db, order_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;
        Ok(lines.into_iter().map(mapper::to_order_line).collect())
    }

    #[instrument(
        name = "storefront.orders.line",
        skip(self),
        fields(user_id = %user_id, order_id = %order_id, line_id = %line_id)
    )]
    pub async fn order_line(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        line_id: Uuid,
    ) -> Result<crate::contract::model::OrderLine, StorefrontError> {
        repo::find_order_for_user(&self.db, user_id, order_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
            .ok_or_else(|| StorefrontError::order_not_found(order_id))?;

        let line = repo::find_order_line(&self.db, order_id, line_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
            .ok_or_else(|| StorefrontError::order_line_not_found(line_id))?;
        Ok(mapper::to_order_line(line))
    }

    /// Unconditional status transition; any status may follow any other.
    #[instrument(name = "storefront.orders.update_status", skip(self), fields(order_id = %order_id))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, StorefrontError> {
        info!("Updating order status to {status}");

        let updated = repo::set_order_status(&self.db, order_id, status.as_str())
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;
        if !updated {
            return Err(StorefrontError::order_not_found(order_id));
        }

        let order = repo::find_order(&self.db, order_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?
            .ok_or_else(|| StorefrontError::order_not_found(order_id))?;
        let lines = repo::order_lines(&self.db, order_id)
            .await
            .map_err(|e| StorefrontError::database(e.to_string()))?;
        mapper::to_order(order, lines)
    }
}
