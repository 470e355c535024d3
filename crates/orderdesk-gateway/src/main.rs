use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use orderdesk_core::RecordStore;
use orderdesk_gateway::{AppState, router};
use orderdesk_platform::{PgRecordStore, ServiceConfig, connect_database, ensure_schema};
use orderdesk_service::OrderDesk;
use orderdesk_store::InMemoryStore;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "orderdesk_gateway=info,orderdesk_service=info,orderdesk_platform=info".to_string()
        }))
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:2019")?;
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(database_url) => {
            let pool = connect_database(database_url, config.max_connections).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgRecordStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; records live in memory and vanish on exit");
            Arc::new(InMemoryStore::new())
        }
    };

    let router = router(AppState::new(OrderDesk::new(store)));

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("orderdesk gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
