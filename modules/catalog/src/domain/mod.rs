pub mod error;
pub mod service;

pub use error::CatalogError;
pub use service::{Service, ServiceConfig};
