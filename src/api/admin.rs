//! Back-office endpoints. All of them sit behind [`require_admin`](crate::auth::require_admin).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiError, AppState, Success};
use crate::domain::aggregates::{Category, CategoryInput, OrderWithItems, ProductInput, ProductWithVariants};
use crate::services::Dashboard;

#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedProduct {
    pub product_id: Uuid,
}

pub async fn dashboard(State(s): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    Ok(Json(s.orders.dashboard().await?))
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<i64>) -> Result<Json<OrderWithItems>, ApiError> {
    Ok(Json(s.orders.order(id).await?))
}

pub async fn update_order_status(
    State(s): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let Json(r) = payload?;
    s.orders.update_status(id, &r.status).await?;
    Ok(Success::new(Empty {}))
}

pub async fn list_products(State(s): State<AppState>) -> Result<Json<Vec<ProductWithVariants>>, ApiError> {
    Ok(Json(s.catalog.products().await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ProductWithVariants>, ApiError> {
    Ok(Json(s.catalog.product(id).await?))
}

pub async fn create_product(
    State(s): State<AppState>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Success<CreatedProduct>>), ApiError> {
    let Json(r) = payload?;
    let product_id = s.catalog.create_product(r).await?;
    Ok((StatusCode::CREATED, Success::new(CreatedProduct { product_id })))
}

pub async fn update_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let Json(r) = payload?;
    s.catalog.update_product(id, r).await?;
    Ok(Success::new(Empty {}))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Success<Empty>>, ApiError> {
    s.catalog.delete_product(id).await?;
    Ok(Success::new(Empty {}))
}

pub async fn create_category(
    State(s): State<AppState>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(r) = payload?;
    Ok((StatusCode::CREATED, Json(s.catalog.create_category(r).await?)))
}
