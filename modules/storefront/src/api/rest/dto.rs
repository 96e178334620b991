use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{Cart, CartLine, Order, OrderLine};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lines: Vec<CartLineDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLineDto {
    pub id: Uuid,
    pub book_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddCartItemReq {
    pub book_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCartLineReq {
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderReq {
    pub shipping_address: String,
}

/// Status token is validated at this boundary; unknown values are a 400.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusReq {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub shipping_address: String,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<OrderLineDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLineDto {
    pub id: Uuid,
    pub book_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl From<Cart> for CartDto {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id,
            lines: cart.lines.into_iter().map(CartLineDto::from).collect(),
        }
    }
}

impl From<CartLine> for CartLineDto {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            book_id: line.book_id,
            quantity: line.quantity,
        }
    }
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status.to_string(),
            shipping_address: order.shipping_address,
            total: order.total,
            placed_at: order.placed_at,
            lines: order.lines.into_iter().map(OrderLineDto::from).collect(),
        }
    }
}

impl From<OrderLine> for OrderLineDto {
    fn from(line: OrderLine) -> Self {
        Self {
            id: line.id,
            book_id: line.book_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}
