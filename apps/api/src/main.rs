mod config;
mod crypto;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::crypto::FieldCipher;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::questions::{BrevityPolicy, LlmQuestionGenerator, QuestionGenerator};
use crate::screening::registry::SessionRegistry;
use crate::screening::store::{CandidateStore, PgCandidateStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screening API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Field cipher — a bad ENCRYPTION_KEY must fail here, before any session
    // can reach a persistence attempt.
    let cipher = FieldCipher::new(&config.encryption_key)
        .map_err(|e| anyhow::anyhow!("ENCRYPTION_KEY rejected: {e}"))?;
    info!("Field cipher initialized");

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
        &config.anthropic_base_url,
        Duration::from_secs(config.generation_timeout_secs),
    );
    info!("LLM client initialized (model: {})", llm.model());

    // Question generator with the default brevity follow-up policy
    let generator: Arc<dyn QuestionGenerator> = Arc::new(LlmQuestionGenerator::new(
        llm,
        Arc::new(BrevityPolicy::default()),
    ));

    // Persistence adapter — the only component that sees ciphertext
    let store: Arc<dyn CandidateStore> = Arc::new(PgCandidateStore::new(db, cipher));

    // Build app state
    let state = AppState {
        generator,
        store,
        sessions: Arc::new(SessionRegistry::default()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
