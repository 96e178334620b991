//! Entity model to contract model conversions.

use crate::contract::model::{Cart, CartLine, Order, OrderLine, OrderStatus};
use crate::domain::error::StorefrontError;
use crate::infra::storage::entity::{cart_items, carts, order_items, orders};

pub fn to_cart(model: carts::Model, lines: Vec<cart_items::Model>) -> Cart {
    Cart {
        id: model.id,
        user_id: model.user_id,
        lines: lines.into_iter().map(to_cart_line).collect(),
    }
}

pub fn to_cart_line(model: cart_items::Model) -> CartLine {
    CartLine {
        id: model.id,
        book_id: model.book_id,
        quantity: model.quantity,
    }
}

/// An unparsable status token means the row was written outside this module;
/// surface it as a storage fault rather than inventing a status.
pub fn to_order(
    model: orders::Model,
    lines: Vec<order_items::Model>,
) -> Result<Order, StorefrontError> {
    let status = OrderStatus::parse(&model.status).ok_or_else(|| {
        StorefrontError::database(format!(
            "order {} carries unknown status '{}'",
            model.id, model.status
        ))
    })?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        status,
        shipping_address: model.shipping_address,
        total: model.total,
        placed_at: model.placed_at,
        lines: lines.into_iter().map(to_order_line).collect(),
    })
}

pub fn to_order_line(model: order_items::Model) -> OrderLine {
    OrderLine {
        id: model.id,
        book_id: model.book_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
    }
}
