//! SeaORM queries for the catalog tables.
//!
//! Every function is generic over `C: ConnectionTrait`, so the same queries
//! run on the pooled connection or inside a transaction.

use std::collections::HashMap;

use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::contract::model::Book;
use crate::infra::storage::entity::{book_categories, books, categories};

// ---- books ----

pub async fn find_book<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<books::Model>, DbErr> {
    books::Entity::find_by_id(id)
        .filter(books::Column::IsDeleted.eq(false))
        .one(conn)
        .await
}

/// True if a non-deleted book other than `exclude` carries this isbn.
pub async fn isbn_taken<C: ConnectionTrait>(
    conn: &C,
    isbn: &str,
    exclude: Option<Uuid>,
) -> Result<bool, DbErr> {
    let mut query = books::Entity::find()
        .filter(books::Column::Isbn.eq(isbn))
        .filter(books::Column::IsDeleted.eq(false));
    if let Some(id) = exclude {
        query = query.filter(books::Column::Id.ne(id));
    }
    let count = query.count(conn).await?;
    Ok(count > 0)
}

pub async fn insert_book<C: ConnectionTrait>(conn: &C, book: &Book) -> Result<(), DbErr> {
    let m = books::ActiveModel {
        id: Set(book.id),
        title: Set(book.title.clone()),
        author: Set(book.author.clone()),
        isbn: Set(book.isbn.clone()),
        price: Set(book.price),
        description: Set(book.description.clone()),
        cover_image: Set(book.cover_image.clone()),
        is_deleted: Set(false),
    };
    let _ = m.insert(conn).await?;
    Ok(())
}

pub async fn update_book<C: ConnectionTrait>(conn: &C, book: &Book) -> Result<(), DbErr> {
    let m = books::ActiveModel {
        id: Set(book.id),
        title: Set(book.title.clone()),
        author: Set(book.author.clone()),
        isbn: Set(book.isbn.clone()),
        price: Set(book.price),
        description: Set(book.description.clone()),
        cover_image: Set(book.cover_image.clone()),
        is_deleted: Set(false),
    };
    let _ = m.update(conn).await?;
    Ok(())
}

/// Soft-delete one book; returns true if a live book was flagged.
pub async fn soft_delete_book<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, DbErr> {
    let res = books::Entity::update_many()
        .col_expr(books::Column::IsDeleted, Expr::value(true))
        .filter(books::Column::Id.eq(id))
        .filter(books::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(res.rows_affected > 0)
}

pub async fn soft_delete_all_books<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    let res = books::Entity::update_many()
        .col_expr(books::Column::IsDeleted, Expr::value(true))
        .filter(books::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

pub async fn list_books<C: ConnectionTrait>(
    conn: &C,
    limit: u64,
    offset: u64,
) -> Result<Vec<books::Model>, DbErr> {
    books::Entity::find()
        .filter(books::Column::IsDeleted.eq(false))
        .order_by_asc(books::Column::Title)
        .limit(limit)
        .offset(offset)
        .all(conn)
        .await
}

pub async fn count_books<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    books::Entity::find()
        .filter(books::Column::IsDeleted.eq(false))
        .count(conn)
        .await
}

/// Apply a composed search condition on top of the soft-delete guard.
pub async fn search_books<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
    limit: u64,
    offset: u64,
) -> Result<Vec<books::Model>, DbErr> {
    books::Entity::find()
        .filter(books::Column::IsDeleted.eq(false))
        .filter(condition)
        .order_by_asc(books::Column::Title)
        .limit(limit)
        .offset(offset)
        .all(conn)
        .await
}

pub async fn count_search_books<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> Result<u64, DbErr> {
    books::Entity::find()
        .filter(books::Column::IsDeleted.eq(false))
        .filter(condition)
        .count(conn)
        .await
}

pub async fn books_by_category<C: ConnectionTrait>(
    conn: &C,
    category_id: Uuid,
) -> Result<Vec<books::Model>, DbErr> {
    books::Entity::find()
        .filter(books::Column::IsDeleted.eq(false))
        .inner_join(book_categories::Entity)
        .filter(book_categories::Column::CategoryId.eq(category_id))
        .order_by_asc(books::Column::Title)
        .all(conn)
        .await
}

// ---- book ↔ category association ----

pub async fn replace_book_categories<C: ConnectionTrait>(
    conn: &C,
    book_id: Uuid,
    category_ids: &[Uuid],
) -> Result<(), DbErr> {
    book_categories::Entity::delete_many()
        .filter(book_categories::Column::BookId.eq(book_id))
        .exec(conn)
        .await?;

    if category_ids.is_empty() {
        return Ok(());
    }

    let rows = category_ids.iter().map(|category_id| book_categories::ActiveModel {
        book_id: Set(book_id),
        category_id: Set(*category_id),
    });
    book_categories::Entity::insert_many(rows).exec(conn).await?;
    Ok(())
}

pub async fn category_ids_of_book<C: ConnectionTrait>(
    conn: &C,
    book_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    let rows = book_categories::Entity::find()
        .filter(book_categories::Column::BookId.eq(book_id))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|r| r.category_id).collect())
}

/// Category ids for a batch of books, grouped by book id.
pub async fn category_ids_of_books<C: ConnectionTrait>(
    conn: &C,
    book_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, DbErr> {
    if book_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = book_categories::Entity::find()
        .filter(book_categories::Column::BookId.is_in(book_ids.iter().copied()))
        .all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for row in rows {
        grouped.entry(row.book_id).or_default().push(row.category_id);
    }
    Ok(grouped)
}

// ---- categories ----

pub async fn find_category<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<categories::Model>, DbErr> {
    categories::Entity::find_by_id(id)
        .filter(categories::Column::IsDeleted.eq(false))
        .one(conn)
        .await
}

pub async fn insert_category<C: ConnectionTrait>(
    conn: &C,
    category: &crate::contract::model::Category,
) -> Result<(), DbErr> {
    let m = categories::ActiveModel {
        id: Set(category.id),
        name: Set(category.name.clone()),
        description: Set(category.description.clone()),
        is_deleted: Set(false),
    };
    let _ = m.insert(conn).await?;
    Ok(())
}

pub async fn update_category<C: ConnectionTrait>(
    conn: &C,
    category: &crate::contract::model::Category,
) -> Result<(), DbErr> {
    let m = categories::ActiveModel {
        id: Set(category.id),
        name: Set(category.name.clone()),
        description: Set(category.description.clone()),
        is_deleted: Set(false),
    };
    let _ = m.update(conn).await?;
    Ok(())
}

pub async fn soft_delete_category<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, DbErr> {
    let res = categories::Entity::update_many()
        .col_expr(categories::Column::IsDeleted, Expr::value(true))
        .filter(categories::Column::Id.eq(id))
        .filter(categories::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(res.rows_affected > 0)
}

pub async fn list_categories<C: ConnectionTrait>(
    conn: &C,
    limit: u64,
    offset: u64,
) -> Result<Vec<categories::Model>, DbErr> {
    categories::Entity::find()
        .filter(categories::Column::IsDeleted.eq(false))
        .order_by_asc(categories::Column::Name)
        .limit(limit)
        .offset(offset)
        .all(conn)
        .await
}

pub async fn count_categories<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    categories::Entity::find()
        .filter(categories::Column::IsDeleted.eq(false))
        .count(conn)
        .await
}
