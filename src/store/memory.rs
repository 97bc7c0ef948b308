//! In-process backend.
//!
//! Mirrors the Postgres schema's constraints (non-negative stock, foreign keys without
//! cascade from order items, unique category slugs) so the services behave the same on
//! both backends. A write works on a copy of the tables and replaces the originals only
//! when every statement succeeded.
//!
//! Meant for tests and local development: every write clones all tables, so its cost
//! grows with the data set, and nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::aggregates::{
    Category, CategoryDraft, Order, OrderDraft, OrderItem, OrderStatus, OrderWithItems, PlacedOrder, Product, ProductDraft, ProductWithVariants,
    Variant, VariantDraft, VariantPlan,
};
use crate::error::{Result, StoreError};
use crate::store::Store;

#[derive(Clone, Debug, Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<Product>,
    variants: Vec<Variant>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    last_order_id: i64,
}

impl Tables {
    fn decrement_stock(&mut self, variant_id: Uuid, quantity: i32) -> Result<()> {
        let variant = self.variants.iter_mut().find(|v| v.id == variant_id).ok_or(StoreError::MissingVariant(variant_id))?;
        let remaining = variant.stock.checked_sub(quantity).filter(|s| *s >= 0);
        match remaining {
            Some(stock) => { variant.stock = stock; Ok(()) }
            None => Err(StoreError::CheckViolation("variants_stock_non_negative".into())),
        }
    }

    fn insert_order_item(&mut self, item: OrderItem) -> Result<()> {
        if let Some(variant_id) = item.variant_id {
            if !self.variants.iter().any(|v| v.id == variant_id) {
                return Err(StoreError::ForeignKeyViolation("order_items_variant_id_fkey".into()));
            }
        }
        self.order_items.push(item);
        Ok(())
    }

    fn insert_variant(&mut self, product_id: Uuid, v: &VariantDraft) -> Result<()> {
        if v.stock < 0 { return Err(StoreError::CheckViolation("variants_stock_non_negative".into())); }
        self.variants.push(Variant { id: Uuid::now_v7(), product_id, name: v.name.clone(), price: v.price.amount(), stock: v.stock });
        Ok(())
    }

    fn check_category(&self, category_id: Uuid) -> Result<()> {
        if self.categories.iter().any(|c| c.id == category_id) { Ok(()) }
        else { Err(StoreError::ForeignKeyViolation("products_category_id_fkey".into())) }
    }

    fn unlink_and_delete_variants(&mut self, ids: &[Uuid]) -> Result<()> {
        for item in self.order_items.iter_mut() {
            if item.variant_id.is_some_and(|v| ids.contains(&v)) { item.variant_id = None; }
        }
        self.delete_variants(ids)
    }

    /// Plain delete. Fails like Postgres would if an order item still points at a variant.
    fn delete_variants(&mut self, ids: &[Uuid]) -> Result<()> {
        if self.order_items.iter().any(|i| i.variant_id.is_some_and(|v| ids.contains(&v))) {
            return Err(StoreError::ForeignKeyViolation("order_items_variant_id_fkey".into()));
        }
        self.variants.retain(|v| !ids.contains(&v.id));
        Ok(())
    }

    fn variant_ids(&self, product_id: Uuid) -> Vec<Uuid> {
        self.variants.iter().filter(|v| v.product_id == product_id).map(|v| v.id).collect()
    }

    fn with_items(&self, order: &Order) -> OrderWithItems {
        let mut items: Vec<OrderItem> = self.order_items.iter().filter(|i| i.order_id == order.id).cloned().collect();
        items.sort_by(|a, b| (&a.product_name, &a.variant_name).cmp(&(&b.product_name, &b.variant_name)));
        OrderWithItems { order: order.clone(), items }
    }

    fn with_variants(&self, product: &Product) -> ProductWithVariants {
        let mut variants: Vec<Variant> = self.variants.iter().filter(|v| v.product_id == product.id).cloned().collect();
        variants.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)));
        let category_name = product.category_id.and_then(|id| self.categories.iter().find(|c| c.id == id)).map(|c| c.name.clone());
        ProductWithVariants { product: product.clone(), category_name, variants }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    accesses: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Number of store operations served so far, reads and writes alike.
    pub fn accesses(&self) -> u64 { self.accesses.load(Ordering::Relaxed) }

    async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&Tables) -> T + Send,
    {
        self.accesses.fetch_add(1, Ordering::Relaxed);
        let tables = self.tables.lock().await;
        f(&tables)
    }

    async fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T> + Send,
    {
        self.accesses.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.lock().await;
        let mut tx = tables.clone();
        let out = f(&mut tx)?;
        *tables = tx;
        Ok(out)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn place_order(&self, draft: &OrderDraft) -> Result<PlacedOrder> {
        self.write(|t| {
            let customer = draft.customer();
            let order_id = t.last_order_id + 1;
            t.last_order_id = order_id;
            t.orders.push(Order {
                id: order_id,
                customer_name: customer.name.clone(),
                customer_phone: customer.phone.clone(),
                customer_address: customer.address.clone(),
                customer_document: customer.document.clone(),
                payment_method: customer.payment_method.as_str().to_string(),
                total: draft.total().amount(),
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            });
            for line in draft.lines_in_lock_order() {
                t.decrement_stock(line.variant_id, i32::try_from(line.quantity).unwrap_or(i32::MAX))?;
            }
            for line in draft.lines() {
                t.insert_order_item(OrderItem {
                    id: Uuid::now_v7(),
                    order_id,
                    variant_id: Some(line.variant_id),
                    product_name: line.product_name.clone(),
                    variant_name: line.variant_name.clone(),
                    price: line.price.amount(),
                    quantity: i32::try_from(line.quantity).unwrap_or(i32::MAX),
                })?;
            }
            Ok(PlacedOrder { order_id, total: draft.total() })
        })
        .await
    }

    async fn set_order_status(&self, order_id: i64, status: OrderStatus) -> Result<()> {
        self.write(|t| {
            let order = t.orders.iter_mut().find(|o| o.id == order_id).ok_or_else(|| StoreError::not_found("order", order_id))?;
            order.status = status;
            Ok(())
        })
        .await
    }

    async fn order(&self, order_id: i64) -> Result<Option<OrderWithItems>> {
        Ok(self.read(|t| t.orders.iter().find(|o| o.id == order_id).map(|o| t.with_items(o))).await)
    }

    async fn recent_orders(&self, limit: i64) -> Result<Vec<OrderWithItems>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self.read(|t| t.orders.iter().rev().take(limit).map(|o| t.with_items(o)).collect()).await)
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.read(|t| {
            let mut cats = t.categories.clone();
            cats.sort_by(|a, b| a.name.cmp(&b.name));
            cats
        }).await)
    }

    async fn insert_category(&self, draft: &CategoryDraft) -> Result<Category> {
        self.write(|t| {
            if t.categories.iter().any(|c| c.slug == draft.slug) {
                return Err(StoreError::UniqueViolation("categories_slug_key".into()));
            }
            let category = Category { id: Uuid::now_v7(), name: draft.name.clone(), slug: draft.slug.clone(), image: draft.image.clone(), created_at: Utc::now() };
            t.categories.push(category.clone());
            Ok(category)
        })
        .await
    }

    async fn products(&self) -> Result<Vec<ProductWithVariants>> {
        Ok(self.read(|t| t.products.iter().rev().map(|p| t.with_variants(p)).collect()).await)
    }

    async fn product(&self, product_id: Uuid) -> Result<Option<ProductWithVariants>> {
        Ok(self.read(|t| t.products.iter().find(|p| p.id == product_id).map(|p| t.with_variants(p))).await)
    }

    async fn insert_product(&self, draft: &ProductDraft) -> Result<Uuid> {
        self.write(|t| {
            t.check_category(draft.category_id)?;
            let product_id = Uuid::now_v7();
            t.products.push(Product {
                id: product_id,
                name: draft.name.clone(),
                description: draft.description.clone(),
                category_id: Some(draft.category_id),
                image: draft.image.clone(),
                is_promo: draft.is_promo,
                created_at: Utc::now(),
            });
            for v in &draft.variants { t.insert_variant(product_id, v)?; }
            Ok(product_id)
        })
        .await
    }

    async fn update_product(&self, product_id: Uuid, draft: &ProductDraft) -> Result<()> {
        self.write(|t| {
            if !t.products.iter().any(|p| p.id == product_id) { return Err(StoreError::not_found("product", product_id)); }
            t.check_category(draft.category_id)?;
            let product = t.products.iter_mut().find(|p| p.id == product_id).ok_or_else(|| StoreError::not_found("product", product_id))?;
            product.name = draft.name.clone();
            product.description = draft.description.clone();
            product.category_id = Some(draft.category_id);
            product.image = draft.image.clone();
            product.is_promo = draft.is_promo;

            let plan = VariantPlan::reconcile(&t.variant_ids(product_id), &draft.variants)?;
            t.unlink_and_delete_variants(&plan.to_delete)?;
            for (id, v) in &plan.to_update {
                if v.stock < 0 { return Err(StoreError::CheckViolation("variants_stock_non_negative".into())); }
                if let Some(existing) = t.variants.iter_mut().find(|x| x.id == *id) {
                    existing.name = v.name.clone();
                    existing.price = v.price.amount();
                    existing.stock = v.stock;
                }
            }
            for v in &plan.to_insert { t.insert_variant(product_id, v)?; }
            Ok(())
        })
        .await
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<()> {
        self.write(|t| {
            let ids = t.variant_ids(product_id);
            t.unlink_and_delete_variants(&ids)?;
            let before = t.products.len();
            t.products.retain(|p| p.id != product_id);
            if t.products.len() == before { return Err(StoreError::not_found("product", product_id)); }
            Ok(())
        })
        .await
    }
}
