//! HTTP boundary.
//!
//! Failures are answered with `{"success": false, "error": "...", "code": "..."}` and a
//! status matching the error kind. Internal failures never carry their cause.

pub mod admin;
pub mod orders;
pub mod storefront;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{middleware, Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, AdminSessions};
use crate::config::Config;
use crate::error::{OrderError, ProductError, StatusError};
use crate::publisher::EventPublisher;
use crate::services::{CatalogService, OrderService};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub catalog: CatalogService,
    pub config: Arc<Config>,
    pub sessions: Arc<AdminSessions>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, events: EventPublisher, config: Config) -> Self {
        Self {
            orders: OrderService::new(store.clone(), events.clone()),
            catalog: CatalogService::new(store, events),
            config: Arc::new(config),
            sessions: Arc::new(AdminSessions::new()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/v1/admin/dashboard", get(admin::dashboard))
        .route("/api/v1/admin/orders/:id", get(admin::get_order))
        .route("/api/v1/admin/orders/:id/status", put(admin::update_order_status))
        .route("/api/v1/admin/products", get(admin::list_products).post(admin::create_product))
        .route("/api/v1/admin/products/:id", get(admin::get_product).put(admin::update_product).delete(admin::delete_product))
        .route("/api/v1/admin/categories", post(admin::create_category))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "storefront"})) }))
        .route("/api/v1/storefront", get(storefront::storefront))
        .route("/api/v1/categories", get(storefront::list_categories))
        .route("/api/v1/orders", post(orders::submit_order))
        .route("/api/v1/admin/login", post(auth::login))
        .route("/api/v1/admin/logout", post(auth::logout))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `{"success": true}` plus whatever the operation returns.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(data: T) -> Json<Self> { Json(Self { success: true, data }) }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error("{0}")]
    BadRequest(String),
    #[error("admin session required")]
    Unauthorized,
    #[error("invalid PIN")]
    InvalidPin,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Order(OrderError::Validation(_))
            | Self::Status(StatusError::Validation(_))
            | Self::Product(ProductError::Validation(_))
            | Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::Order(OrderError::InsufficientStock) => (StatusCode::CONFLICT, "insufficient_stock"),
            Self::Order(OrderError::VariantUnavailable(_)) => (StatusCode::CONFLICT, "variant_unavailable"),
            Self::Order(OrderError::NotFound(_)) | Self::Status(StatusError::NotFound(_)) | Self::Product(ProductError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            Self::Product(ProductError::Conflict(_)) => (StatusCode::CONFLICT, "conflict"),
            Self::Product(ProductError::ReferentialConflict(_)) => (StatusCode::CONFLICT, "referential_conflict"),
            Self::Unauthorized | Self::InvalidPin => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Order(OrderError::Internal) | Self::Status(StatusError::Internal) | Self::Product(ProductError::Internal) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        (status, Json(json!({"success": false, "error": self.to_string(), "code": code}))).into_response()
    }
}
