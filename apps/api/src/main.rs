mod config;
mod db;
mod errors;
mod intake;
mod labs;
mod llm_client;
mod matching;
mod models;
mod presentation;
mod results;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LabStoreConfig};
use crate::db::create_pool;
use crate::intake::UploadPolicy;
use crate::labs::{LabStore, PgLabStore, RestLabStore};
use crate::llm_client::LlmClient;
use crate::matching::MatchPipeline;
use crate::results::{MemoryResultStore, RedisResultStore, ResultStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SlugLabs API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize lab row store
    let labs = build_lab_store(&config).await?;

    // Initialize result store
    let results: Arc<dyn ResultStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Saved matches stored in Redis");
            Arc::new(RedisResultStore::new(client))
        }
        None => {
            info!("REDIS_URL not set; saved matches are kept in memory");
            Arc::new(MemoryResultStore::default())
        }
    };

    let pipeline = MatchPipeline::new(
        Arc::new(llm),
        labs.clone(),
        results.clone(),
        config.response_format,
    );
    info!("Match pipeline ready (response format: {:?})", config.response_format);

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        labs,
        results,
        upload_policy: UploadPolicy::from_config(&config),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the Postgres store when DATABASE_URL is set, the REST store otherwise.
async fn build_lab_store(config: &Config) -> Result<Arc<dyn LabStore>> {
    match &config.lab_store {
        LabStoreConfig::Postgres { database_url } => {
            let pool = create_pool(database_url, &config.labs_table).await?;
            info!("Reading labs from Postgres table '{}'", config.labs_table);
            Ok(Arc::new(PgLabStore::new(pool, &config.labs_table)))
        }
        LabStoreConfig::Rest { base_url, api_key } => {
            let store = RestLabStore::new(base_url, api_key.clone(), &config.labs_table)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            info!("Reading labs from {base_url} table '{}'", config.labs_table);
            Ok(Arc::new(store))
        }
    }
}
