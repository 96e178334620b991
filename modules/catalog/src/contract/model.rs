use rust_decimal::Decimal;
use uuid::Uuid;

/// Pure book model for inter-module communication (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category_ids: Vec<Uuid>,
}

/// Data for creating a new book (also used for full replace on update)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Sparse multi-field search parameters. Tokens within a field OR-match,
/// fields AND-match across. All fields empty means match-all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookSearchParams {
    pub title: Vec<String>,
    pub author: Vec<String>,
    pub isbn: Vec<String>,
}

impl BookSearchParams {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.author.is_empty() && self.isbn.is_empty()
    }
}

/// Offset pagination request (0-based page index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

impl PageRequest {
    /// Saturates instead of overflowing; `page` comes straight from the
    /// query string.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_page_times_size() {
        let page = PageRequest { page: 3, size: 20 };
        assert_eq!(page.offset(), 60);
    }

    #[test]
    fn offset_saturates_on_huge_page_numbers() {
        let page = PageRequest {
            page: u64::MAX,
            size: 20,
        };
        assert_eq!(page.offset(), u64::MAX);
    }

    #[test]
    fn search_params_emptiness() {
        assert!(BookSearchParams::default().is_empty());
        let params = BookSearchParams {
            isbn: vec!["9780441013593".to_string()],
            ..Default::default()
        };
        assert!(!params.is_empty());
    }
}
