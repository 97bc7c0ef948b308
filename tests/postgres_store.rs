#![cfg(feature = "test-postgres")]

use std::sync::Arc;

use rust_decimal_macros::dec;
use sqlx::PgPool;
use storefront::domain::aggregates::{CartLine, CategoryInput, CustomerInfo, PaymentMethod, ProductInput, ProductWithVariants, VariantInput};
use storefront::services::{CatalogService, OrderService};
use storefront::{EventPublisher, OrderError, PgStore, StoreError};
use uuid::Uuid;

struct Shop {
    pool: PgPool,
    orders: OrderService,
    catalog: CatalogService,
}

fn shop(pool: PgPool) -> Shop {
    let store = Arc::new(PgStore::new(pool.clone()));
    let events = EventPublisher::local_only();
    Shop { orders: OrderService::new(store.clone(), events.clone()), catalog: CatalogService::new(store, events), pool }
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Maria Silva".into(), phone: "(83) 99418-9808".into(), document: None,
        address: "Rua das Flores, 10".into(), payment_method: PaymentMethod::Pix,
    }
}

fn variant(id: Option<Uuid>, name: &str, price: &str, stock: i32) -> VariantInput {
    VariantInput { id, name: name.into(), price: price.into(), stock }
}

fn input(category_id: Uuid, variants: Vec<VariantInput>) -> ProductInput {
    ProductInput {
        name: "Cerveja Lata".into(), description: None, category_id: Some(category_id.to_string()),
        image: None, is_promo: false, variants,
    }
}

fn line(p: &ProductWithVariants, idx: usize, quantity: u32) -> CartLine {
    let v = &p.variants[idx];
    CartLine {
        product_id: p.product.id, variant_id: v.id, product_name: p.product.name.clone(),
        variant_name: v.name.clone(), price: v.price.to_string().as_str().into(), quantity,
    }
}

impl Shop {
    async fn product(&self, variants: Vec<VariantInput>) -> ProductWithVariants {
        let category = self.catalog.create_category(CategoryInput { name: "Bebidas".into(), image: None }).await.unwrap();
        let id = self.catalog.create_product(input(category.id, variants)).await.unwrap();
        self.catalog.product(id).await.unwrap()
    }

    async fn order_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(&self.pool).await.unwrap()
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_order_decrements_stock(pool: PgPool) {
    let shop = shop(pool);
    let p = shop.product(vec![variant(None, "Brahma (350ml)", "10.00", 5)]).await;

    let placed = shop.orders.submit_order(customer(), vec![line(&p, 0, 2)]).await.unwrap();

    assert_eq!(placed.total.amount(), dec!(20.00));
    assert_eq!(shop.catalog.product(p.product.id).await.unwrap().variants[0].stock, 3);
    let order = shop.orders.order(placed.order_id).await.unwrap();
    assert_eq!(order.order.total, dec!(20.00));
    assert_eq!(order.items[0].variant_id, Some(p.variants[0].id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_oversold_order_rolls_back(pool: PgPool) {
    let shop = shop(pool);
    let p = shop.product(vec![variant(None, "Skol (350ml)", "3.50", 10), variant(None, "Heineken (350ml)", "6.00", 1)]).await;

    let err = shop.orders.submit_order(customer(), vec![line(&p, 0, 4), line(&p, 1, 2)]).await.unwrap_err();

    assert_eq!(err, OrderError::InsufficientStock);
    let after = shop.catalog.product(p.product.id).await.unwrap();
    assert_eq!((after.variants[0].stock, after.variants[1].stock), (10, 1));
    assert_eq!(shop.order_count().await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_dropped_variant_is_unlinked(pool: PgPool) {
    let shop = shop(pool);
    let p = shop.product(vec![variant(None, "Lata (350ml)", "4.00", 10), variant(None, "Long Neck (355ml)", "6.50", 10)]).await;
    let placed = shop.orders.submit_order(customer(), vec![line(&p, 1, 2)]).await.unwrap();

    let edit = input(p.product.category_id.unwrap(), vec![variant(Some(p.variants[0].id), "Lata (350ml)", "4.50", 10)]);
    shop.catalog.update_product(p.product.id, edit).await.unwrap();

    let after = shop.catalog.product(p.product.id).await.unwrap();
    assert_eq!(after.variants.len(), 1);
    assert_eq!(after.variants[0].id, p.variants[0].id);
    assert_eq!(after.variants[0].price, dec!(4.50));
    let item = &shop.orders.order(placed.order_id).await.unwrap().items[0];
    assert_eq!(item.variant_id, None);
    assert_eq!((item.variant_name.as_str(), item.price), ("Long Neck (355ml)", dec!(6.50)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_sqlstate_classification(pool: PgPool) {
    let shop = shop(pool.clone());
    let p = shop.product(vec![variant(None, "Lata (350ml)", "4.00", 1)]).await;

    let check = sqlx::query("UPDATE variants SET stock = -1 WHERE id = $1").bind(p.variants[0].id).execute(&pool).await.unwrap_err();
    assert!(matches!(StoreError::from(check), StoreError::CheckViolation(c) if c == "variants_stock_non_negative"));

    let dup = sqlx::query("INSERT INTO categories (id, name, slug) VALUES ($1, 'Bebidas', 'bebidas')").bind(Uuid::now_v7()).execute(&pool).await.unwrap_err();
    assert!(matches!(StoreError::from(dup), StoreError::UniqueViolation(_)));

    let orphan = sqlx::query("INSERT INTO products (id, name, category_id, image) VALUES ($1, 'X', $2, 'x')")
        .bind(Uuid::now_v7()).bind(Uuid::now_v7()).execute(&pool).await.unwrap_err();
    assert!(matches!(StoreError::from(orphan), StoreError::ForeignKeyViolation(c) if c.contains("category")));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_foreign_variant_id_rolls_back_edit(pool: PgPool) {
    let shop = shop(pool);
    let p = shop.product(vec![variant(None, "Lata (350ml)", "4.00", 10)]).await;

    let mut edit = input(p.product.category_id.unwrap(), vec![variant(Some(Uuid::new_v4()), "Intrusa", "1.00", 1)]);
    edit.name = "Renamed".into();
    assert!(shop.catalog.update_product(p.product.id, edit).await.is_err());

    assert_eq!(shop.catalog.product(p.product.id).await.unwrap(), p);
}
