#![allow(dead_code)]

use std::sync::Arc;

use storefront::domain::aggregates::{CartLine, CategoryInput, CustomerInfo, PaymentMethod, ProductInput, ProductWithVariants, VariantInput};
use storefront::services::{CatalogService, OrderService};
use storefront::{EventPublisher, MemoryStore};
use uuid::Uuid;

pub struct Shop {
    pub store: Arc<MemoryStore>,
    pub orders: OrderService,
    pub catalog: CatalogService,
    pub events: EventPublisher,
}

pub fn shop() -> Shop {
    let store = Arc::new(MemoryStore::new());
    let events = EventPublisher::local_only();
    Shop {
        orders: OrderService::new(store.clone(), events.clone()),
        catalog: CatalogService::new(store.clone(), events.clone()),
        store,
        events,
    }
}

pub fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Maria Silva".into(),
        phone: "(83) 99418-9808".into(),
        document: None,
        address: "Rua das Flores, 10".into(),
        payment_method: PaymentMethod::Pix,
    }
}

pub fn variant(id: Option<Uuid>, name: &str, price: &str, stock: i32) -> VariantInput {
    VariantInput { id, name: name.into(), price: price.into(), stock }
}

pub fn product_input(category_id: Uuid, variants: Vec<VariantInput>) -> ProductInput {
    ProductInput {
        name: "Cerveja Lata".into(),
        description: None,
        category_id: Some(category_id.to_string()),
        image: Some("🍺".into()),
        is_promo: false,
        variants,
    }
}

impl Shop {
    pub async fn category(&self, name: &str) -> Uuid {
        self.catalog.create_category(CategoryInput { name: name.into(), image: None }).await.unwrap().id
    }

    /// Product in the "Bebidas" category with the given variants. Variants come back
    /// ordered by price.
    pub async fn product(&self, variants: Vec<VariantInput>) -> ProductWithVariants {
        let existing = self.catalog.categories().await.unwrap().into_iter().find(|c| c.slug == "bebidas");
        let category_id = match existing {
            Some(c) => c.id,
            None => self.category("Bebidas").await,
        };
        let product_id = self.catalog.create_product(product_input(category_id, variants)).await.unwrap();
        self.catalog.product(product_id).await.unwrap()
    }

    pub async fn stock(&self, product_id: Uuid, variant_id: Uuid) -> i32 {
        let p = self.catalog.product(product_id).await.unwrap();
        p.variants.iter().find(|v| v.id == variant_id).map(|v| v.stock).unwrap()
    }
}

pub fn line(p: &ProductWithVariants, variant_idx: usize, price: &str, quantity: u32) -> CartLine {
    let v = &p.variants[variant_idx];
    CartLine {
        product_id: p.product.id,
        variant_id: v.id,
        product_name: p.product.name.clone(),
        variant_name: v.name.clone(),
        price: price.into(),
        quantity,
    }
}
