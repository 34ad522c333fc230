//! Server binary: read configuration, open the store, seed the operator
//! identity and serve the API.

use std::sync::Arc;

use anyhow::Context;
use satchel::store::SqliteStore;
use satchel::{ExchangeService, ServiceConfig};
use satchel_api::{ApiConfig, AppState, SessionManager};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ApiConfig::from_env()?;

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("opening database at {}", config.db_path.display()))?;

    let mut service_config = ServiceConfig::default();
    if let Some(credential) = config.operator_credential.clone() {
        service_config.operator_credential = credential;
    }

    let service = ExchangeService::new(store, service_config);
    let operator = service.bootstrap().await?;
    info!(operator = %operator.username, "exchange ready");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", config.upload_dir.display()))?;

    let state = AppState {
        service: Arc::new(service),
        sessions: Arc::new(SessionManager::new()),
        upload_dir: config.upload_dir.clone(),
    };

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "listening");

    axum::serve(listener, satchel_api::router(state)).await?;
    Ok(())
}
