//! Product maintenance and catalog reads.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{Category, CategoryDraft, CategoryInput, ProductDraft, ProductInput, ProductWithVariants};
use crate::domain::events::DomainEvent;
use crate::error::{ProductError, StoreError};
use crate::publisher::EventPublisher;
use crate::store::Store;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
    events: EventPublisher,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontSection {
    pub category: String,
    pub products: Vec<ProductWithVariants>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Storefront {
    pub categories: Vec<Category>,
    pub sections: Vec<StorefrontSection>,
}

/// Translates a store failure into something the admin can read. `product_id` is the
/// product the operation targeted, if any.
fn product_error(err: StoreError, product_id: Option<Uuid>) -> ProductError {
    match err {
        StoreError::NotFound { entity: "product", .. } => match product_id {
            Some(id) => ProductError::NotFound(id),
            None => ProductError::Internal,
        },
        StoreError::Reconcile(e) => ProductError::Validation(e.to_string()),
        StoreError::CheckViolation(_) => ProductError::Validation("stock cannot be negative".into()),
        StoreError::ForeignKeyViolation(c) if c.contains("category") => ProductError::Validation("category does not exist".into()),
        StoreError::ForeignKeyViolation(c) => {
            tracing::error!(constraint = %c, "referential conflict while saving catalog");
            ProductError::ReferentialConflict(c)
        }
        StoreError::UniqueViolation(_) => ProductError::Conflict("a category with this name already exists".into()),
        e => {
            tracing::error!(error = %e, "catalog storage failure");
            ProductError::Internal
        }
    }
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, events: EventPublisher) -> Self { Self { store, events } }

    /// Categories by name plus products grouped under their category's name.
    pub async fn storefront(&self) -> Result<Storefront, ProductError> {
        let categories = self.store.categories().await.map_err(|e| product_error(e, None))?;
        let products = self.store.products().await.map_err(|e| product_error(e, None))?;
        let mut grouped: BTreeMap<String, Vec<ProductWithVariants>> = BTreeMap::new();
        for p in products { grouped.entry(p.category_label().to_string()).or_default().push(p); }
        let sections = grouped.into_iter().map(|(category, products)| StorefrontSection { category, products }).collect();
        Ok(Storefront { categories, sections })
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ProductError> {
        self.store.categories().await.map_err(|e| product_error(e, None))
    }

    pub async fn create_category(&self, input: CategoryInput) -> Result<Category, ProductError> {
        let draft = CategoryDraft::new(input)?;
        let category = self.store.insert_category(&draft).await.map_err(|e| product_error(e, None))?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        self.events.publish(DomainEvent::CategoryCreated { category_id: category.id, slug: category.slug.clone() }).await;
        Ok(category)
    }

    /// Newest first.
    pub async fn products(&self) -> Result<Vec<ProductWithVariants>, ProductError> {
        self.store.products().await.map_err(|e| product_error(e, None))
    }

    pub async fn product(&self, product_id: Uuid) -> Result<ProductWithVariants, ProductError> {
        self.store.product(product_id).await.map_err(|e| product_error(e, Some(product_id)))?.ok_or(ProductError::NotFound(product_id))
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Uuid, ProductError> {
        let draft = ProductDraft::new(input)?;
        let product_id = self.store.insert_product(&draft).await.map_err(|e| product_error(e, None))?;
        tracing::info!(%product_id, variants = draft.variants.len(), "product created");
        self.events.publish(DomainEvent::ProductCreated { product_id }).await;
        Ok(product_id)
    }

    /// Saves the product form. Variants keep their ids; variants missing from the form are
    /// removed after their order items are unlinked. All of it commits or none of it does.
    pub async fn update_product(&self, product_id: Uuid, input: ProductInput) -> Result<(), ProductError> {
        let draft = ProductDraft::new(input)?;
        self.store.update_product(product_id, &draft).await.map_err(|e| product_error(e, Some(product_id)))?;
        tracing::info!(%product_id, variants = draft.variants.len(), "product updated");
        self.events.publish(DomainEvent::ProductUpdated { product_id }).await;
        Ok(())
    }

    /// Removes the product and its variants. Past orders keep their items, unlinked.
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ProductError> {
        self.store.delete_product(product_id).await.map_err(|e| product_error(e, Some(product_id)))?;
        tracing::info!(%product_id, "product deleted");
        self.events.publish(DomainEvent::ProductDeleted { product_id }).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::ReconcileError;

    #[test]
    fn test_product_error_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(product_error(StoreError::not_found("product", id), Some(id)), ProductError::NotFound(id));
        assert!(matches!(product_error(StoreError::Reconcile(ReconcileError::UnknownVariant(id)), Some(id)), ProductError::Validation(_)));
        assert!(matches!(product_error(StoreError::ForeignKeyViolation("products_category_id_fkey".into()), None), ProductError::Validation(_)));
        assert!(matches!(
            product_error(StoreError::ForeignKeyViolation("order_items_variant_id_fkey".into()), Some(id)),
            ProductError::ReferentialConflict(_)
        ));
        assert!(matches!(product_error(StoreError::UniqueViolation("categories_slug_key".into()), None), ProductError::Conflict(_)));
    }
}
