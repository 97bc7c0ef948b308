//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;

pub use cart::Cart;
pub use order::{CartLine, CustomerInfo, Order, OrderDraft, OrderItem, OrderLine, OrderStatus, OrderWithItems, PaymentMethod, PlacedOrder, UnknownStatus};
pub use product::{
    Category, CategoryDraft, CategoryInput, Product, ProductDraft, ProductInput, ProductWithVariants, ReconcileError, Variant, VariantDraft,
    VariantInput, VariantPlan, PLACEHOLDER_IMAGE,
};
