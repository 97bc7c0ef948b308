//! Public catalog reads.

use axum::extract::State;
use axum::Json;

use crate::api::{ApiError, AppState};
use crate::domain::aggregates::Category;
use crate::services::Storefront;

pub async fn storefront(State(s): State<AppState>) -> Result<Json<Storefront>, ApiError> {
    Ok(Json(s.catalog.storefront().await?))
}

pub async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(s.catalog.categories().await?))
}
