//! Order submission and back-office order handling.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::aggregates::{CartLine, CustomerInfo, OrderDraft, OrderStatus, OrderWithItems, PlacedOrder};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::Money;
use crate::error::{OrderError, StatusError, StoreError};
use crate::publisher::EventPublisher;
use crate::store::Store;

/// How many orders the dashboard shows and bases its figures on.
pub const DASHBOARD_ORDER_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    events: EventPublisher,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub orders: Vec<OrderWithItems>,
    pub revenue: Money,
    pub pending: usize,
    pub delivered: usize,
}

impl Dashboard {
    fn from_orders(orders: Vec<OrderWithItems>) -> Self {
        let revenue = orders.iter().fold(Money::ZERO, |acc, o| acc.add(Money::new(o.order.total)));
        let count = |status: OrderStatus| orders.iter().filter(|o| o.order.status == status).count();
        let (pending, delivered) = (count(OrderStatus::Pending), count(OrderStatus::Delivered));
        Self { orders, revenue, pending, delivered }
    }
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, events: EventPublisher) -> Self { Self { store, events } }

    /// Validates the checkout payload and places the order.
    pub async fn submit_order(&self, customer: CustomerInfo, lines: Vec<CartLine>) -> Result<PlacedOrder, OrderError> {
        let draft = OrderDraft::new(customer, lines).inspect_err(|e| tracing::debug!(error = %e, "checkout rejected"))?;
        self.place(&draft).await
    }

    /// Persists an already validated draft in one transaction.
    pub async fn place(&self, draft: &OrderDraft) -> Result<PlacedOrder, OrderError> {
        match self.store.place_order(draft).await {
            Ok(placed) => {
                tracing::info!(order_id = placed.order_id, total = %placed.total, lines = draft.lines().len(), "order placed");
                self.events.publish(DomainEvent::OrderPlaced { order_id: placed.order_id, total: placed.total.amount() }).await;
                Ok(placed)
            }
            Err(StoreError::CheckViolation(constraint)) => {
                tracing::warn!(%constraint, "order rolled back, insufficient stock");
                Err(OrderError::InsufficientStock)
            }
            Err(StoreError::MissingVariant(variant_id)) => {
                tracing::warn!(%variant_id, "order rolled back, variant no longer exists");
                Err(OrderError::VariantUnavailable(variant_id))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create order");
                Err(OrderError::Internal)
            }
        }
    }

    /// Sets the status of an order. Setting the current status again succeeds.
    pub async fn update_status(&self, order_id: i64, status: &str) -> Result<(), StatusError> {
        let status = status.parse::<OrderStatus>().map_err(|e| StatusError::Validation(e.to_string()))?;
        match self.store.set_order_status(order_id, status).await {
            Ok(()) => {
                tracing::info!(order_id, %status, "order status updated");
                self.events.publish(DomainEvent::OrderStatusChanged { order_id, status }).await;
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => Err(StatusError::NotFound(order_id)),
            Err(e) => {
                tracing::error!(order_id, error = %e, "failed to update order status");
                Err(StatusError::Internal)
            }
        }
    }

    pub async fn order(&self, order_id: i64) -> Result<OrderWithItems, OrderError> {
        match self.store.order(order_id).await {
            Ok(Some(order)) => Ok(order),
            Ok(None) => Err(OrderError::NotFound(order_id)),
            Err(e) => {
                tracing::error!(order_id, error = %e, "failed to load order");
                Err(OrderError::Internal)
            }
        }
    }

    pub async fn dashboard(&self) -> Result<Dashboard, OrderError> {
        let orders = self.store.recent_orders(DASHBOARD_ORDER_LIMIT).await.map_err(|e| {
            tracing::error!(error = %e, "failed to load recent orders");
            OrderError::Internal
        })?;
        Ok(Dashboard::from_orders(orders))
    }
}
