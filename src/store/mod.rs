//! Storage port.
//!
//! Every write operation is one transaction: either all of its statements commit or the
//! caller observes none of them. Two backends exist: Postgres for real deployments and an
//! in-process store with the same constraint semantics.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Category, CategoryDraft, OrderDraft, OrderStatus, OrderWithItems, PlacedOrder, ProductDraft, ProductWithVariants};
use crate::error::Result;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Inserts the order and its items and decrements stock for every line, atomically.
    /// Stock going negative surfaces as [`StoreError::CheckViolation`](crate::error::StoreError::CheckViolation).
    async fn place_order(&self, draft: &OrderDraft) -> Result<PlacedOrder>;

    async fn set_order_status(&self, order_id: i64, status: OrderStatus) -> Result<()>;

    async fn order(&self, order_id: i64) -> Result<Option<OrderWithItems>>;

    /// Newest first, with items.
    async fn recent_orders(&self, limit: i64) -> Result<Vec<OrderWithItems>>;

    /// Ordered by name.
    async fn categories(&self) -> Result<Vec<Category>>;

    async fn insert_category(&self, draft: &CategoryDraft) -> Result<Category>;

    /// Newest first, with category name and variants.
    async fn products(&self) -> Result<Vec<ProductWithVariants>>;

    async fn product(&self, product_id: Uuid) -> Result<Option<ProductWithVariants>>;

    async fn insert_product(&self, draft: &ProductDraft) -> Result<Uuid>;

    /// Updates the product row and reconciles its variants with
    /// [`VariantPlan`](crate::domain::aggregates::VariantPlan), unlinking order items from
    /// removed variants before deleting them.
    async fn update_product(&self, product_id: Uuid, draft: &ProductDraft) -> Result<()>;

    /// Unlinks order items from the product's variants, then deletes variants and product.
    async fn delete_product(&self, product_id: Uuid) -> Result<()>;
}
