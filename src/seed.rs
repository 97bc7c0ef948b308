//! Demo catalog for a fresh development instance.

use crate::domain::aggregates::{CategoryInput, ProductInput, VariantInput};
use crate::error::ProductError;
use crate::services::CatalogService;

struct DemoProduct {
    category: &'static str,
    name: &'static str,
    description: &'static str,
    image: &'static str,
    is_promo: bool,
    variants: &'static [(&'static str, &'static str, i32)],
}

const CATEGORIES: &[(&str, &str)] =
    &[("Açougue", "🥩"), ("Bebidas", "🍺"), ("Laticínios", "🧀"), ("Hortifruti", "🍎"), ("Mercearia", "🥫")];

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        category: "Açougue", name: "Picanha Fatiada", description: "Corte nobre, ideal para churrasco.", image: "🥩", is_promo: true,
        variants: &[("Peça Inteira (1.2kg aprox)", "89.90", 10), ("Fatiada (Bandeja 500g)", "45.90", 20)],
    },
    DemoProduct {
        category: "Açougue", name: "Linguiça Toscana", description: "Linguiça suína temperada.", image: "🌭", is_promo: false,
        variants: &[("Aurora (1kg)", "22.50", 50), ("Sadia (1kg)", "24.90", 40)],
    },
    DemoProduct {
        category: "Bebidas", name: "Cerveja Lata", description: "Cerveja pilsen gelada.", image: "🍺", is_promo: true,
        variants: &[("Brahma (350ml)", "3.89", 200), ("Heineken (350ml)", "5.99", 150), ("Spaten (350ml)", "4.50", 100)],
    },
    DemoProduct {
        category: "Bebidas", name: "Refrigerante 2L", description: "Refrigerante sabor cola.", image: "🥤", is_promo: false,
        variants: &[("Coca-Cola Original", "10.90", 100), ("Guaraná Antarctica", "8.50", 80)],
    },
    DemoProduct {
        category: "Laticínios", name: "Margarina", description: "Cremosa com sal.", image: "🧈", is_promo: false,
        variants: &[("Qualy (500g)", "9.90", 60), ("Deline (500g)", "6.50", 40)],
    },
    DemoProduct {
        category: "Hortifruti", name: "Banana Prata", description: "Banana madura e doce.", image: "🍌", is_promo: false,
        variants: &[("Penca (aprox 1kg)", "5.99", 30)],
    },
];

/// Creates the demo categories and products through the catalog service. Returns the
/// number of products created. Fails on a catalog that already holds the categories.
pub async fn demo_catalog(catalog: &CatalogService) -> Result<usize, ProductError> {
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, image) in CATEGORIES {
        let category = catalog.create_category(CategoryInput { name: name.to_string(), image: Some(image.to_string()) }).await?;
        category_ids.push((*name, category.id));
    }

    for p in PRODUCTS {
        let category_id = category_ids.iter().find(|(name, _)| *name == p.category).map(|(_, id)| id.to_string());
        let variants = p
            .variants
            .iter()
            .map(|(name, price, stock)| VariantInput { id: None, name: name.to_string(), price: (*price).into(), stock: *stock })
            .collect();
        catalog
            .create_product(ProductInput {
                name: p.name.to_string(),
                description: Some(p.description.to_string()),
                category_id,
                image: Some(p.image.to_string()),
                is_promo: p.is_promo,
                variants,
            })
            .await?;
    }

    tracing::info!(categories = CATEGORIES.len(), products = PRODUCTS.len(), "demo catalog seeded");
    Ok(PRODUCTS.len())
}
