//! Storefront module: per-user shopping carts, the checkout workflow that
//! turns a cart into an order, and user-scoped order reads.

pub mod api;
pub mod contract;
pub mod domain;
pub mod infra;
