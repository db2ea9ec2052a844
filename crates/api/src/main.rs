use std::sync::Arc;

use anyhow::Context;

use vendora_api::app::{build_app, AppState};
use vendora_api::config::AppConfig;
use vendora_auth::{TokenConfig, TokenService};
use vendora_infra::{MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vendora_observability::init();

    let config = AppConfig::from_env();
    let tokens = Arc::new(TokenService::new(TokenConfig::new(
        config.jwt_secret.clone(),
    )));

    let state = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.context("connecting to Postgres")?;
            store.migrate().await.context("applying schema")?;
            tracing::info!("using Postgres store");
            AppState::new(Arc::new(store), tokens)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using volatile in-memory store");
            AppState::new(Arc::new(MemoryStore::new()), tokens)
        }
    };

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
