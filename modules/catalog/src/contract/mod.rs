pub mod client;
pub mod error;
pub mod model;

pub use client::CatalogApi;
pub use error::CatalogApiError;
pub use model::{Book, BookSearchParams, Category, NewBook, NewCategory, Page, PageRequest};
