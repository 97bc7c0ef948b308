//! Domain events
//!
//! Every mutation raises one event. Besides being published on the bus, an event
//! tells the rendering layer which cached views went stale.
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::OrderStatus;

pub const STOREFRONT_VIEW: &str = "/";
pub const DASHBOARD_VIEW: &str = "/admin/dashboard";
pub const PRODUCTS_VIEW: &str = "/admin/dashboard/products";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    OrderPlaced { order_id: i64, total: Decimal },
    OrderStatusChanged { order_id: i64, status: OrderStatus },
    ProductCreated { product_id: Uuid },
    ProductUpdated { product_id: Uuid },
    ProductDeleted { product_id: Uuid },
    CategoryCreated { category_id: Uuid, slug: String },
}

impl DomainEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "order_placed",
            Self::OrderStatusChanged { .. } => "order_status_changed",
            Self::ProductCreated { .. } => "product_created",
            Self::ProductUpdated { .. } => "product_updated",
            Self::ProductDeleted { .. } => "product_deleted",
            Self::CategoryCreated { .. } => "category_created",
        }
    }

    /// Views whose cached rendering must be refreshed after this event.
    pub fn stale_views(&self) -> &'static [&'static str] {
        match self {
            // stock changed, so the storefront must not keep selling sold-out variants
            Self::OrderPlaced { .. } => &[DASHBOARD_VIEW, PRODUCTS_VIEW, STOREFRONT_VIEW],
            Self::OrderStatusChanged { .. } => &[DASHBOARD_VIEW],
            Self::ProductCreated { .. } | Self::ProductUpdated { .. } | Self::ProductDeleted { .. } => &[PRODUCTS_VIEW, STOREFRONT_VIEW],
            Self::CategoryCreated { .. } => &[STOREFRONT_VIEW],
        }
    }
}
