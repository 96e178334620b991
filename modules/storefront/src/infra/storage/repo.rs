//! SeaORM queries for the storefront tables.
//!
//! Every function is generic over `C: ConnectionTrait`, so the same queries
//! run on the pooled connection or inside the checkout transaction.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::infra::storage::entity::{cart_items, carts, order_items, orders};

// ---- carts ----

pub async fn find_cart_by_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<carts::Model>, DbErr> {
    carts::Entity::find()
        .filter(carts::Column::UserId.eq(user_id))
        .filter(carts::Column::IsDeleted.eq(false))
        .one(conn)
        .await
}

pub async fn insert_cart<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    user_id: Uuid,
) -> Result<carts::Model, DbErr> {
    let m = carts::ActiveModel {
        id: Set(id),
        user_id: Set(user_id),
        is_deleted: Set(false),
    };
    carts::Entity::insert(m).exec(conn).await?;
    Ok(carts::Model {
        id,
        user_id,
        is_deleted: false,
    })
}

/// Soft-delete the cart row; its lines are removed separately.
pub async fn soft_delete_cart<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> Result<(), DbErr> {
    carts::Entity::update_many()
        .col_expr(carts::Column::IsDeleted, Expr::value(true))
        .filter(carts::Column::Id.eq(cart_id))
        .exec(conn)
        .await?;
    Ok(())
}

// ---- cart lines ----

pub async fn cart_lines<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
) -> Result<Vec<cart_items::Model>, DbErr> {
    cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .all(conn)
        .await
}

pub async fn find_cart_line_by_book<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
    book_id: Uuid,
) -> Result<Option<cart_items::Model>, DbErr> {
    cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .filter(cart_items::Column::BookId.eq(book_id))
        .one(conn)
        .await
}

/// Line lookup with ownership folded into the query: only lines of the
/// user's live cart are visible.
pub async fn find_cart_line_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    line_id: Uuid,
) -> Result<Option<cart_items::Model>, DbErr> {
    cart_items::Entity::find_by_id(line_id)
        .inner_join(carts::Entity)
        .filter(carts::Column::UserId.eq(user_id))
        .filter(carts::Column::IsDeleted.eq(false))
        .one(conn)
        .await
}

pub async fn insert_cart_line<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
    book_id: Uuid,
    quantity: i32,
) -> Result<(), DbErr> {
    let m = cart_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart_id),
        book_id: Set(book_id),
        quantity: Set(quantity),
    };
    cart_items::Entity::insert(m).exec(conn).await?;
    Ok(())
}

pub async fn set_cart_line_quantity<C: ConnectionTrait>(
    conn: &C,
    line_id: Uuid,
    quantity: i32,
) -> Result<(), DbErr> {
    cart_items::Entity::update_many()
        .col_expr(cart_items::Column::Quantity, Expr::value(quantity))
        .filter(cart_items::Column::Id.eq(line_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn delete_cart_line<C: ConnectionTrait>(conn: &C, line_id: Uuid) -> Result<(), DbErr> {
    cart_items::Entity::delete_by_id(line_id).exec(conn).await?;
    Ok(())
}

pub async fn delete_cart_lines<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> Result<(), DbErr> {
    cart_items::Entity::delete_many()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .exec(conn)
        .await?;
    Ok(())
}

// ---- orders ----

/// The user's most recent order, the accumulation candidate for checkout.
pub async fn latest_order_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find()
        .filter(orders::Column::UserId.eq(user_id))
        .order_by_desc(orders::Column::PlacedAt)
        .one(conn)
        .await
}

pub async fn insert_order<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
) -> Result<(), DbErr> {
    let m = orders::ActiveModel {
        id: Set(order.id),
        user_id: Set(order.user_id),
        status: Set(order.status.clone()),
        shipping_address: Set(order.shipping_address.clone()),
        total: Set(order.total),
        placed_at: Set(order.placed_at),
    };
    orders::Entity::insert(m).exec(conn).await?;
    Ok(())
}

pub async fn set_order_total<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    total: Decimal,
) -> Result<(), DbErr> {
    orders::Entity::update_many()
        .col_expr(orders::Column::Total, Expr::value(total))
        .filter(orders::Column::Id.eq(order_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn set_order_status<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    status: &str,
) -> Result<bool, DbErr> {
    let res = orders::Entity::update_many()
        .col_expr(orders::Column::Status, Expr::value(status))
        .filter(orders::Column::Id.eq(order_id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected > 0)
}

pub async fn find_order<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find_by_id(order_id).one(conn).await
}

pub async fn find_order_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    order_id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find_by_id(order_id)
        .filter(orders::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

pub async fn orders_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<orders::Model>, DbErr> {
    orders::Entity::find()
        .filter(orders::Column::UserId.eq(user_id))
        .order_by_desc(orders::Column::PlacedAt)
        .all(conn)
        .await
}

// ---- order lines ----

pub async fn order_lines<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<order_items::Model>, DbErr> {
    order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .all(conn)
        .await
}

pub async fn find_order_line<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    line_id: Uuid,
) -> Result<Option<order_items::Model>, DbErr> {
    order_items::Entity::find_by_id(line_id)
        .filter(order_items::Column::OrderId.eq(order_id))
        .one(conn)
        .await
}

pub async fn insert_order_line<C: ConnectionTrait>(
    conn: &C,
    line: &order_items::Model,
) -> Result<(), DbErr> {
    let m = order_items::ActiveModel {
        id: Set(line.id),
        order_id: Set(line.order_id),
        book_id: Set(line.book_id),
        quantity: Set(line.quantity),
        unit_price: Set(line.unit_price),
    };
    order_items::Entity::insert(m).exec(conn).await?;
    Ok(())
}
