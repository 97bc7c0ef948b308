//! Storefront server

use std::sync::Arc;

use anyhow::Result;
use storefront::api::{self, AppState};
use storefront::seed;
use storefront::{Config, EventPublisher, MemoryStore, PgStore, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let in_memory = config.database_url.is_none();
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections).await?;
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store: development only, writes copy all data and nothing survives a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, events stay in-process");
                None
            }
        },
        None => None,
    };

    let port = config.port;
    let state = AppState::new(store, EventPublisher::new(nats), config);
    if in_memory {
        seed::demo_catalog(&state.catalog).await?;
    }
    let app = api::router(state);

    tracing::info!("🚀 Storefront listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
