use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{Book, BookSearchParams, Category, NewBook, NewCategory, Page};

/// REST DTO for book representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category_ids: Vec<Uuid>,
}

/// REST DTO for creating a book; also the full-replace update payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBookReq {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookPageDto {
    pub items: Vec<BookDto>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryReq {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryPageDto {
    pub items: Vec<CategoryDto>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

/// REST DTO for pagination query parameters (0-based page index)
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
}

/// REST DTO for search query parameters. Each field takes a comma-separated
/// token list, e.g. `?author=Herbert,Asimov&title=Dune`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

fn csv_tokens(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl From<&SearchQuery> for BookSearchParams {
    fn from(q: &SearchQuery) -> Self {
        Self {
            title: csv_tokens(&q.title),
            author: csv_tokens(&q.author),
            isbn: csv_tokens(&q.isbn),
        }
    }
}

// Conversion implementations between REST DTOs and contract models

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            price: book.price,
            description: book.description,
            cover_image: book.cover_image,
            category_ids: book.category_ids,
        }
    }
}

impl From<CreateBookReq> for NewBook {
    fn from(req: CreateBookReq) -> Self {
        Self {
            title: req.title,
            author: req.author,
            isbn: req.isbn,
            price: req.price,
            description: req.description,
            cover_image: req.cover_image,
            category_ids: req.category_ids,
        }
    }
}

impl From<Page<Book>> for BookPageDto {
    fn from(page: Page<Book>) -> Self {
        Self {
            items: page.items.into_iter().map(BookDto::from).collect(),
            total: page.total,
            page: page.page,
            size: page.size,
        }
    }
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

impl From<CreateCategoryReq> for NewCategory {
    fn from(req: CreateCategoryReq) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

impl From<Page<Category>> for CategoryPageDto {
    fn from(page: Page<Category>) -> Self {
        Self {
            items: page.items.into_iter().map(CategoryDto::from).collect(),
            total: page.total,
            page: page.page,
            size: page.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_tokens_split_and_trim() {
        let raw = Some("Herbert, Asimov ,,".to_string());
        assert_eq!(csv_tokens(&raw), vec!["Herbert", "Asimov"]);
        assert!(csv_tokens(&None).is_empty());
    }

    #[test]
    fn search_query_maps_to_params() {
        let q = SearchQuery {
            title: Some("Dune".to_string()),
            author: None,
            isbn: Some("a,b".to_string()),
            page: None,
            size: None,
        };
        let params = BookSearchParams::from(&q);
        assert_eq!(params.title, vec!["Dune"]);
        assert!(params.author.is_empty());
        assert_eq!(params.isbn, vec!["a", "b"]);
    }
}
