use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use uuid::Uuid;

use auth::{AdminUser, AuthUser};

use crate::api::rest::dto::{
    BookDto, BookPageDto, CategoryDto, CategoryPageDto, CreateBookReq, CreateCategoryReq,
    PageQuery, SearchQuery,
};
use crate::api::rest::error::ApiError;
use crate::contract::model::{BookSearchParams, PageRequest};
use crate::domain::service::Service;

const ISBN13_LEN: usize = 13;

fn page_request(page: Option<u64>, size: Option<u64>) -> PageRequest {
    let default = PageRequest::default();
    PageRequest {
        page: page.unwrap_or(default.page),
        size: size.unwrap_or(default.size),
    }
}

fn validate_book_req(req: &CreateBookReq) -> Result<(), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    if req.author.trim().is_empty() {
        return Err(ApiError::bad_request("author must not be empty"));
    }
    if req.isbn.len() != ISBN13_LEN {
        return Err(ApiError::bad_request(format!(
            "isbn must be exactly {ISBN13_LEN} characters"
        )));
    }
    if req.price <= Decimal::ZERO {
        return Err(ApiError::bad_request("price must be positive"));
    }
    Ok(())
}

// --- books ---

#[utoipa::path(
    post,
    path = "/books",
    tag = "catalog",
    request_body = CreateBookReq,
    responses(
        (status = 201, description = "Book created", body = BookDto),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "ISBN already in use"),
    )
)]
pub async fn create_book(
    Extension(service): Extension<Arc<Service>>,
    _admin: AdminUser,
    Json(req): Json<CreateBookReq>,
) -> Result<(StatusCode, Json<BookDto>), ApiError> {
    validate_book_req(&req)?;
    let book = service.create_book(req.into()).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book found", body = BookDto),
        (status = 404, description = "Book not found"),
    )
)]
pub async fn get_book(
    Extension(service): Extension<Arc<Service>>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookDto>, ApiError> {
    let book = service.get_book(id).await?;
    Ok(Json(book.into()))
}

#[utoipa::path(
    get,
    path = "/books",
    tag = "catalog",
    responses((status = 200, description = "Page of books", body = BookPageDto))
)]
pub async fn list_books(
    Extension(service): Extension<Arc<Service>>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<BookPageDto>, ApiError> {
    let page = service
        .list_books(page_request(query.page, query.size))
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/books/search",
    tag = "catalog",
    responses((status = 200, description = "Page of matching books", body = BookPageDto))
)]
pub async fn search_books(
    Extension(service): Extension<Arc<Service>>,
    _user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<BookPageDto>, ApiError> {
    let params = BookSearchParams::from(&query);
    let page = service
        .search_books(params, page_request(query.page, query.size))
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = CreateBookReq,
    responses(
        (status = 200, description = "Book updated", body = BookDto),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already in use"),
    )
)]
pub async fn update_book(
    Extension(service): Extension<Arc<Service>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateBookReq>,
) -> Result<Json<BookDto>, ApiError> {
    validate_book_req(&req)?;
    let book = service.update_book(id, req.into()).await?;
    Ok(Json(book.into()))
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
    )
)]
pub async fn delete_book(
    Extension(service): Extension<Arc<Service>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/books",
    tag = "catalog",
    responses((status = 204, description = "All books deleted"))
)]
pub async fn delete_all_books(
    Extension(service): Extension<Arc<Service>>,
    _admin: AdminUser,
) -> Result<StatusCode, ApiError> {
    service.delete_all_books().await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- categories ---

#[utoipa::path(
    post,
    path = "/categories",
    tag = "catalog",
    request_body = CreateCategoryReq,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Invalid payload"),
    )
)]
pub async fn create_category(
    Extension(service): Extension<Arc<Service>>,
    _admin: AdminUser,
    Json(req): Json<CreateCategoryReq>,
) -> Result<(StatusCode, Json<CategoryDto>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    let category = service.create_category(req.into()).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = CategoryDto),
        (status = 404, description = "Category not found"),
    )
)]
pub async fn get_category(
    Extension(service): Extension<Arc<Service>>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryDto>, ApiError> {
    let category = service.get_category(id).await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "catalog",
    responses((status = 200, description = "Page of categories", body = CategoryPageDto))
)]
pub async fn list_categories(
    Extension(service): Extension<Arc<Service>>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<CategoryPageDto>, ApiError> {
    let page = service
        .list_categories(page_request(query.page, query.size))
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CreateCategoryReq,
    responses(
        (status = 200, description = "Category updated", body = CategoryDto),
        (status = 404, description = "Category not found"),
    )
)]
pub async fn update_category(
    Extension(service): Extension<Arc<Service>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCategoryReq>,
) -> Result<Json<CategoryDto>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    let category = service.update_category(id, req.into()).await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found"),
    )
)]
pub async fn delete_category(
    Extension(service): Extension<Arc<Service>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/categories/{id}/books",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Category id")),
    responses((status = 200, description = "Books in the category", body = [BookDto]))
)]
pub async fn books_by_category(
    Extension(service): Extension<Arc<Service>>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BookDto>>, ApiError> {
    let books = service.books_by_category(id).await?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_req() -> CreateBookReq {
        CreateBookReq {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441013593".to_string(),
            price: Decimal::new(1099, 2),
            description: None,
            cover_image: None,
            category_ids: vec![],
        }
    }

    #[test]
    fn valid_book_req_passes() {
        assert!(validate_book_req(&sample_req()).is_ok());
    }

    #[test]
    fn short_isbn_rejected() {
        let mut req = sample_req();
        req.isbn = "12345".to_string();
        assert!(validate_book_req(&req).is_err());
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut req = sample_req();
        req.price = Decimal::ZERO;
        assert!(validate_book_req(&req).is_err());
    }

    #[test]
    fn blank_title_rejected() {
        let mut req = sample_req();
        req.title = "  ".to_string();
        assert!(validate_book_req(&req).is_err());
    }
}
