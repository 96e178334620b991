use std::sync::Arc;

use axum::routing::{get, patch, post, put};
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::cart::CartService;
use crate::domain::orders::OrderService;

/// Builds the storefront router with both domain services injected as
/// extensions. Paths are relative to the server mount point.
pub fn router(carts: Arc<CartService>, orders: Arc<OrderService>) -> Router {
    Router::new()
        .route(
            "/cart",
            get(handlers::get_cart).post(handlers::add_cart_item),
        )
        .route(
            "/cart/items/{id}",
            put(handlers::update_cart_line).delete(handlers::remove_cart_line),
        )
        .route(
            "/orders",
            post(handlers::place_order).get(handlers::list_orders),
        )
        .route("/orders/{id}", patch(handlers::update_order_status))
        .route("/orders/{id}/items", get(handlers::order_lines))
        .route("/orders/{id}/items/{item_id}", get(handlers::order_line))
        .layer(Extension(carts))
        .layer(Extension(orders))
}
