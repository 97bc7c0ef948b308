//! Refresh signals.
//!
//! Events go to in-process subscribers (a cache or view layer) and, when configured, to
//! NATS as JSON on `storefront.events.<kind>`. Delivery is best effort: a publish failure
//! is logged and never fails the operation that raised the event.

use tokio::sync::broadcast;

use crate::domain::events::DomainEvent;

pub const SUBJECT_PREFIX: &str = "storefront.events";
const LOCAL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
    local: broadcast::Sender<DomainEvent>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        let (local, _) = broadcast::channel(LOCAL_CAPACITY);
        Self { nats, local }
    }

    pub fn local_only() -> Self { Self::new(None) }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> { self.local.subscribe() }

    pub async fn publish(&self, event: DomainEvent) {
        tracing::debug!(kind = event.kind(), stale_views = ?event.stale_views(), "publishing domain event");

        if let Some(client) = &self.nats {
            match serde_json::to_vec(&event) {
                Ok(payload) => {
                    let subject = format!("{SUBJECT_PREFIX}.{}", event.kind());
                    if let Err(e) = client.publish(subject, payload.into()).await {
                        tracing::warn!(kind = event.kind(), error = %e, "failed to publish event to NATS");
                    }
                }
                Err(e) => tracing::warn!(kind = event.kind(), error = %e, "failed to encode event"),
            }
        }

        // no subscribers is fine
        let _ = self.local.send(event);
    }
}

impl Default for EventPublisher {
    fn default() -> Self { Self::local_only() }
}
