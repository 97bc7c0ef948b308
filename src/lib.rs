//! Storefront
//!
//! Catalog and ordering backend for a small shop that takes orders over WhatsApp.
//!
//! ## Features
//! - Public catalog grouped by category
//! - Atomic order placement with stock decrement
//! - Order status tracking and a back-office dashboard
//! - Product maintenance with id-preserving variant reconciliation
//! - PIN-protected admin session

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod notification;
pub mod publisher;
pub mod seed;
pub mod services;
pub mod store;

pub use config::Config;
pub use domain::value_objects::Money;
pub use error::{OrderError, ProductError, StatusError, StoreError};
pub use publisher::EventPublisher;
pub use store::{MemoryStore, PgStore, Store};
