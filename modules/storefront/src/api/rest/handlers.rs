use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use auth::{AdminUser, AuthUser};

use crate::api::rest::dto::{
    AddCartItemReq, CartDto, OrderDto, OrderLineDto, PlaceOrderReq, UpdateCartLineReq,
    UpdateOrderStatusReq,
};
use crate::api::rest::error::ApiError;
use crate::contract::model::{OrderStatus, PlaceOrderRequest};
use crate::domain::cart::CartService;
use crate::domain::orders::OrderService;

fn validate_quantity(quantity: i32) -> Result<(), ApiError> {
    if quantity <= 0 {
        return Err(ApiError::bad_request("quantity must be positive"));
    }
    Ok(())
}

// --- cart ---

#[utoipa::path(
    get,
    path = "/cart",
    tag = "storefront",
    responses(
        (status = 200, description = "The caller's cart", body = CartDto),
        (status = 404, description = "No cart yet"),
    )
)]
pub async fn get_cart(
    Extension(carts): Extension<Arc<CartService>>,
    user: AuthUser,
) -> Result<Json<CartDto>, ApiError> {
    let cart = carts.get_cart(user.id).await?;
    Ok(Json(cart.into()))
}

#[utoipa::path(
    post,
    path = "/cart",
    tag = "storefront",
    request_body = AddCartItemReq,
    responses(
        (status = 200, description = "Updated cart", body = CartDto),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Book not found"),
    )
)]
pub async fn add_cart_item(
    Extension(carts): Extension<Arc<CartService>>,
    user: AuthUser,
    Json(req): Json<AddCartItemReq>,
) -> Result<Json<CartDto>, ApiError> {
    validate_quantity(req.quantity)?;
    let cart = carts.add_item(user.id, req.book_id, req.quantity).await?;
    Ok(Json(cart.into()))
}

#[utoipa::path(
    put,
    path = "/cart/items/{id}",
    tag = "storefront",
    params(("id" = Uuid, Path, description = "Cart line id")),
    request_body = UpdateCartLineReq,
    responses(
        (status = 200, description = "Updated cart", body = CartDto),
        (status = 404, description = "Cart line not found"),
    )
)]
pub async fn update_cart_line(
    Extension(carts): Extension<Arc<CartService>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCartLineReq>,
) -> Result<Json<CartDto>, ApiError> {
    validate_quantity(req.quantity)?;
    let cart = carts.update_line_quantity(user.id, id, req.quantity).await?;
    Ok(Json(cart.into()))
}

#[utoipa::path(
    delete,
    path = "/cart/items/{id}",
    tag = "storefront",
    params(("id" = Uuid, Path, description = "Cart line id")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 404, description = "Cart line not found"),
    )
)]
pub async fn remove_cart_line(
    Extension(carts): Extension<Arc<CartService>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    carts.remove_line(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- orders ---

#[utoipa::path(
    post,
    path = "/orders",
    tag = "storefront",
    request_body = PlaceOrderReq,
    responses(
        (status = 201, description = "Order placed", body = OrderDto),
        (status = 404, description = "No cart to check out"),
    )
)]
pub async fn place_order(
    Extension(orders): Extension<Arc<OrderService>>,
    user: AuthUser,
    Json(req): Json<PlaceOrderReq>,
) -> Result<(StatusCode, Json<OrderDto>), ApiError> {
    if req.shipping_address.trim().is_empty() {
        return Err(ApiError::bad_request("shipping_address must not be empty"));
    }
    let order = orders
        .place_order(
            user.id,
            PlaceOrderRequest {
                shipping_address: req.shipping_address,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "storefront",
    responses((status = 200, description = "The caller's orders", body = [OrderDto]))
)]
pub async fn list_orders(
    Extension(orders): Extension<Arc<OrderService>>,
    user: AuthUser,
) -> Result<Json<Vec<OrderDto>>, ApiError> {
    let result = orders.list_orders(user.id).await?;
    Ok(Json(result.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/items",
    tag = "storefront",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Lines of the order", body = [OrderLineDto]),
        (status = 404, description = "Order not found"),
    )
)]
pub async fn order_lines(
    Extension(orders): Extension<Arc<OrderService>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OrderLineDto>>, ApiError> {
    let lines = orders.order_lines(user.id, id).await?;
    Ok(Json(lines.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/items/{item_id}",
    tag = "storefront",
    params(
        ("id" = Uuid, Path, description = "Order id"),
        ("item_id" = Uuid, Path, description = "Order line id"),
    ),
    responses(
        (status = 200, description = "One order line", body = OrderLineDto),
        (status = 404, description = "Order or line not found"),
    )
)]
pub async fn order_line(
    Extension(orders): Extension<Arc<OrderService>>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<OrderLineDto>, ApiError> {
    let line = orders.order_line(user.id, id, item_id).await?;
    Ok(Json(line.into()))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}",
    tag = "storefront",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusReq,
    responses(
        (status = 200, description = "Order updated", body = OrderDto),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found"),
    )
)]
pub async fn update_order_status(
    Extension(orders): Extension<Arc<OrderService>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusReq>,
) -> Result<Json<OrderDto>, ApiError> {
    let status = OrderStatus::parse(&req.status)
        .ok_or_else(|| ApiError::bad_request(format!("unknown order status '{}'", req.status)))?;
    let order = orders.update_status(id, status).await?;
    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_quantities_rejected() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1).is_ok());
    }
}
