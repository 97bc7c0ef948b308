//! Postgres backend.
//!
//! Money columns are `NUMERIC(10, 2)` bound as `rust_decimal::Decimal`. The
//! `variants_stock_non_negative` check constraint is what turns an oversold cart into a
//! rolled-back transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::aggregates::{
    Category, CategoryDraft, Order, OrderDraft, OrderItem, OrderStatus, OrderWithItems, PlacedOrder, Product, ProductDraft, ProductWithVariants,
    Variant, VariantDraft, VariantPlan,
};
use crate::error::{Result, StoreError};
use crate::store::Store;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_name: String,
    customer_phone: String,
    customer_address: String,
    customer_document: Option<String>,
    payment_method: String,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self> {
        let status = row.status.parse::<OrderStatus>().map_err(|_| StoreError::Corrupt { column: "orders.status", value: row.status.clone() })?;
        Ok(Order {
            id: row.id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_address: row.customer_address,
            customer_document: row.customer_document,
            payment_method: row.payment_method,
            total: row.total,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    #[sqlx(flatten)]
    product: Product,
    category_name: Option<String>,
}

const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.description, p.category_id, p.image, p.is_promo, p.created_at, c.name AS category_name \
     FROM products p LEFT JOIN categories c ON c.id = p.category_id";

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn connect(url: &str, max_connections: u32) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn items_for(&self, order_ids: &[i64]) -> Result<HashMap<i64, Vec<OrderItem>>> {
        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ANY($1) ORDER BY product_name, variant_name")
            .bind(order_ids).fetch_all(&self.pool).await?;
        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items { by_order.entry(item.order_id).or_default().push(item); }
        Ok(by_order)
    }

    async fn with_variants(&self, rows: Vec<ProductRow>) -> Result<Vec<ProductWithVariants>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.product.id).collect();
        let variants = sqlx::query_as::<_, Variant>("SELECT * FROM variants WHERE product_id = ANY($1) ORDER BY price, name")
            .bind(&ids).fetch_all(&self.pool).await?;
        let mut by_product: HashMap<Uuid, Vec<Variant>> = HashMap::new();
        for v in variants { by_product.entry(v.product_id).or_default().push(v); }
        Ok(rows.into_iter().map(|r| {
            let variants = by_product.remove(&r.product.id).unwrap_or_default();
            ProductWithVariants { product: r.product, category_name: r.category_name, variants }
        }).collect())
    }
}

fn quantity(q: u32) -> i32 { i32::try_from(q).unwrap_or(i32::MAX) }

async fn insert_variant(tx: &mut Transaction<'_, Postgres>, product_id: Uuid, v: &VariantDraft) -> Result<()> {
    sqlx::query("INSERT INTO variants (id, product_id, name, price, stock) VALUES ($1, $2, $3, $4, $5)")
        .bind(Uuid::now_v7()).bind(product_id).bind(&v.name).bind(v.price.amount()).bind(v.stock)
        .execute(&mut **tx).await?;
    Ok(())
}

/// Nulls the weak `order_items.variant_id` reference, then removes the variants.
async fn unlink_and_delete_variants(tx: &mut Transaction<'_, Postgres>, ids: &[Uuid]) -> Result<()> {
    if ids.is_empty() { return Ok(()); }
    let unlinked = sqlx::query("UPDATE order_items SET variant_id = NULL WHERE variant_id = ANY($1)").bind(ids).execute(&mut **tx).await?;
    sqlx::query("DELETE FROM variants WHERE id = ANY($1)").bind(ids).execute(&mut **tx).await?;
    tracing::debug!(variants = ids.len(), order_items_unlinked = unlinked.rows_affected(), "removed variants");
    Ok(())
}

async fn variant_ids_for_update(tx: &mut Transaction<'_, Postgres>, product_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM variants WHERE product_id = $1 FOR UPDATE")
        .bind(product_id).fetch_all(&mut **tx).await?;
    Ok(ids)
}

#[async_trait]
impl Store for PgStore {
    async fn place_order(&self, draft: &OrderDraft) -> Result<PlacedOrder> {
        let customer = draft.customer();
        let mut tx = self.pool.begin().await?;

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (customer_name, customer_phone, customer_address, customer_document, payment_method, total, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&customer.name).bind(&customer.phone).bind(&customer.address).bind(&customer.document)
        .bind(customer.payment_method.as_str()).bind(draft.total().amount()).bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx).await?;

        // relative update: concurrent orders serialize on the row, the check constraint decides
        for line in draft.lines_in_lock_order() {
            let updated = sqlx::query("UPDATE variants SET stock = stock - $1 WHERE id = $2")
                .bind(quantity(line.quantity)).bind(line.variant_id).execute(&mut *tx).await?;
            if updated.rows_affected() == 0 { return Err(StoreError::MissingVariant(line.variant_id)); }
        }

        for line in draft.lines() {
            sqlx::query("INSERT INTO order_items (id, order_id, variant_id, product_name, variant_name, price, quantity) VALUES ($1, $2, $3, $4, $5, $6, $7)")
                .bind(Uuid::now_v7()).bind(order_id).bind(line.variant_id).bind(&line.product_name).bind(&line.variant_name)
                .bind(line.price.amount()).bind(quantity(line.quantity))
                .execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(PlacedOrder { order_id, total: draft.total() })
    }

    async fn set_order_status(&self, order_id: i64, status: OrderStatus) -> Result<()> {
        let updated = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1").bind(order_id).bind(status.as_str()).execute(&self.pool).await?;
        if updated.rows_affected() == 0 { return Err(StoreError::not_found("order", order_id)); }
        Ok(())
    }

    async fn order(&self, order_id: i64) -> Result<Option<OrderWithItems>> {
        let Some(row) = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };
        let items = self.items_for(&[order_id]).await?.remove(&order_id).unwrap_or_default();
        Ok(Some(OrderWithItems { order: row.try_into()?, items }))
    }

    async fn recent_orders(&self, limit: i64) -> Result<Vec<OrderWithItems>> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders ORDER BY created_at DESC, id DESC LIMIT $1")
            .bind(limit).fetch_all(&self.pool).await?;
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for(&ids).await?;
        rows.into_iter().map(|row| {
            let items = items.remove(&row.id).unwrap_or_default();
            Ok(OrderWithItems { order: row.try_into()?, items })
        }).collect()
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let cats = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name").fetch_all(&self.pool).await?;
        Ok(cats)
    }

    async fn insert_category(&self, draft: &CategoryDraft) -> Result<Category> {
        let c = sqlx::query_as::<_, Category>("INSERT INTO categories (id, name, slug, image, created_at) VALUES ($1, $2, $3, $4, NOW()) RETURNING *")
            .bind(Uuid::now_v7()).bind(&draft.name).bind(&draft.slug).bind(&draft.image)
            .fetch_one(&self.pool).await?;
        Ok(c)
    }

    async fn products(&self) -> Result<Vec<ProductWithVariants>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} ORDER BY p.created_at DESC")).fetch_all(&self.pool).await?;
        self.with_variants(rows).await
    }

    async fn product(&self, product_id: Uuid) -> Result<Option<ProductWithVariants>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1")).bind(product_id).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(self.with_variants(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_product(&self, draft: &ProductDraft) -> Result<Uuid> {
        let product_id = Uuid::now_v7();
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO products (id, name, description, category_id, image, is_promo, created_at) VALUES ($1, $2, $3, $4, $5, $6, NOW())")
            .bind(product_id).bind(&draft.name).bind(&draft.description).bind(draft.category_id).bind(&draft.image).bind(draft.is_promo)
            .execute(&mut *tx).await?;
        for v in &draft.variants { insert_variant(&mut tx, product_id, v).await?; }
        tx.commit().await?;
        Ok(product_id)
    }

    async fn update_product(&self, product_id: Uuid, draft: &ProductDraft) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query("UPDATE products SET name = $2, description = $3, category_id = $4, image = $5, is_promo = $6 WHERE id = $1")
            .bind(product_id).bind(&draft.name).bind(&draft.description).bind(draft.category_id).bind(&draft.image).bind(draft.is_promo)
            .execute(&mut *tx).await?;
        if updated.rows_affected() == 0 { return Err(StoreError::not_found("product", product_id)); }

        let persisted = variant_ids_for_update(&mut tx, product_id).await?;
        let plan = VariantPlan::reconcile(&persisted, &draft.variants)?;

        unlink_and_delete_variants(&mut tx, &plan.to_delete).await?;
        for (id, v) in &plan.to_update {
            sqlx::query("UPDATE variants SET name = $3, price = $4, stock = $5 WHERE id = $1 AND product_id = $2")
                .bind(id).bind(product_id).bind(&v.name).bind(v.price.amount()).bind(v.stock)
                .execute(&mut *tx).await?;
        }
        for v in &plan.to_insert { insert_variant(&mut tx, product_id, v).await?; }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let variant_ids = variant_ids_for_update(&mut tx, product_id).await?;
        unlink_and_delete_variants(&mut tx, &variant_ids).await?;
        let deleted = sqlx::query("DELETE FROM products WHERE id = $1").bind(product_id).execute(&mut *tx).await?;
        if deleted.rows_affected() == 0 { return Err(StoreError::not_found("product", product_id)); }
        tx.commit().await?;
        Ok(())
    }
}
