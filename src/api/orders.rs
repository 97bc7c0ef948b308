//! Checkout.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState, Success};
use crate::domain::aggregates::{CartLine, CustomerInfo, OrderDraft};
use crate::domain::value_objects::Money;
use crate::notification::{order_message, whatsapp_link};

/// Any total the client sends along is ignored; the total is recomputed from the lines.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderRequest {
    pub customer: CustomerInfo,
    pub items: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResponse {
    pub order_id: i64,
    pub total: Money,
    pub message: String,
    pub whatsapp_link: String,
}

pub async fn submit_order(
    State(s): State<AppState>,
    payload: Result<Json<SubmitOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Success<SubmitOrderResponse>>), ApiError> {
    let Json(r) = payload?;
    let draft = OrderDraft::new(r.customer, r.items)?;
    let placed = s.orders.place(&draft).await?;
    let message = order_message(&placed, &draft);
    let whatsapp_link = whatsapp_link(&s.config.whatsapp_number, &message);
    Ok((StatusCode::CREATED, Success::new(SubmitOrderResponse { order_id: placed.order_id, total: placed.total, message, whatsapp_link })))
}
