//! Application services. Each public operation validates its input before touching the
//! store and returns a typed error instead of panicking across the boundary.
pub mod catalog;
pub mod orders;

pub use catalog::{CatalogService, Storefront, StorefrontSection};
pub use orders::{Dashboard, OrderService, DASHBOARD_ORDER_LIMIT};
