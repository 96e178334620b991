//! Catalog module: books, categories, and the composable predicate search
//! engine over the book catalog.

pub mod api;
pub mod contract;
pub mod domain;
pub mod gateways;
pub mod infra;
