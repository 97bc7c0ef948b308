//! Product Aggregate
//!
//! Catalog rows (categories, products, variants), the validated form payloads that
//! mutate them, and the variant reconciliation plan used when a product is edited.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use crate::domain::describe_validation;
use crate::domain::value_objects::{slugify, Money, PriceInput};
use crate::error::ProductError;

/// Stored when a product is saved without an image.
pub const PLACEHOLDER_IMAGE: &str = "📦";

/// Shown on the storefront for products without a category.
pub const DEFAULT_CATEGORY_NAME: &str = "Geral";

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub image: String,
    pub is_promo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

impl Variant {
    pub fn in_stock(&self) -> bool { self.stock > 0 }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub variants: Vec<Variant>,
}

impl ProductWithVariants {
    pub fn category_label(&self) -> &str { self.category_name.as_deref().unwrap_or(DEFAULT_CATEGORY_NAME) }
    pub fn total_stock(&self) -> i64 { self.variants.iter().map(|v| i64::from(v.stock)).sum() }
}

/// Admin product form.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_promo: bool,
    #[validate(length(min = 1, message = "at least one variant is required"))]
    pub variants: Vec<VariantInput>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    /// Absent for variants added in the form.
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "variant name is required"))]
    pub name: String,
    pub price: PriceInput,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantDraft {
    pub id: Option<Uuid>,
    pub name: String,
    pub price: Money,
    pub stock: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub image: String,
    pub is_promo: bool,
    pub variants: Vec<VariantDraft>,
}

impl ProductDraft {
    pub fn new(input: ProductInput) -> Result<Self, ProductError> {
        let mut input = input;
        input.name = input.name.trim().to_string();
        input.validate().map_err(|e| ProductError::Validation(describe_validation(&e)))?;

        let category_id = match input.category_id.as_deref().map(str::trim) {
            None | Some("") => return Err(ProductError::Validation("category is required".into())),
            Some(raw) => Uuid::parse_str(raw).map_err(|_| ProductError::Validation(format!("category id `{raw}` is not valid")))?,
        };

        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(input.variants.len());
        for v in input.variants {
            v.validate().map_err(|e| ProductError::Validation(describe_validation(&e)))?;
            if let Some(id) = v.id {
                if !seen.insert(id) { return Err(ProductError::Validation(format!("variant {id} appears twice"))); }
            }
            let price = v.price.to_money().map_err(|e| ProductError::Validation(format!("{}: {e}", v.name.trim())))?;
            variants.push(VariantDraft { id: v.id, name: v.name.trim().to_string(), price, stock: v.stock });
        }

        let image = input.image.map(|i| i.trim().to_string()).filter(|i| !i.is_empty()).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        let description = input.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

        Ok(Self { name: input.name, description, category_id, image, is_promo: input.is_promo, variants })
    }
}

/// What an edit does to a product's persisted variants.
///
/// Variants keep their identity across edits so that order items pointing at them stay
/// linked. Only variants dropped from the form lose it, and their order items are
/// unlinked before the rows go away.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantPlan {
    pub to_delete: Vec<Uuid>,
    pub to_update: Vec<(Uuid, VariantDraft)>,
    pub to_insert: Vec<VariantDraft>,
}

impl VariantPlan {
    /// Diffs the persisted variant ids against the submitted variant list.
    ///
    /// Fails if the form carries an id that is not one of `persisted`, which would
    /// otherwise let an edit rewrite another product's variant.
    pub fn reconcile(persisted: &[Uuid], incoming: &[VariantDraft]) -> Result<Self, ReconcileError> {
        let persisted_set: HashSet<Uuid> = persisted.iter().copied().collect();
        let mut kept = HashSet::new();
        let mut plan = Self::default();

        for draft in incoming {
            match draft.id {
                Some(id) if persisted_set.contains(&id) => {
                    kept.insert(id);
                    plan.to_update.push((id, draft.clone()));
                }
                Some(id) => return Err(ReconcileError::UnknownVariant(id)),
                None => plan.to_insert.push(draft.clone()),
            }
        }

        plan.to_delete = persisted.iter().copied().filter(|id| !kept.contains(id)).collect();
        Ok(plan)
    }

    pub fn is_noop_for_identity(&self) -> bool { self.to_delete.is_empty() && self.to_insert.is_empty() }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("variant {0} does not belong to this product")]
    UnknownVariant(Uuid),
}

/// Admin category form.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
}

impl CategoryDraft {
    pub fn new(input: CategoryInput) -> Result<Self, ProductError> {
        let name = input.name.trim().to_string();
        let input = CategoryInput { name, ..input };
        input.validate().map_err(|e| ProductError::Validation(describe_validation(&e)))?;
        let slug = slugify(&input.name);
        if slug.is_empty() { return Err(ProductError::Validation(format!("`{}` does not produce a usable slug", input.name))); }
        let image = input.image.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());
        Ok(Self { name: input.name, slug, image })
    }
}
