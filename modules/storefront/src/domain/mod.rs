pub mod cart;
pub mod error;
pub mod orders;
