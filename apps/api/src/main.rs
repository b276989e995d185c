mod artifacts;
mod config;
mod db;
mod errors;
mod interview;
mod job_search;
mod llm_client;
mod matching;
mod resume;
mod routes;
mod speech;
mod state;
mod tools;
mod workflow;

#[cfg(test)]
mod test_utils;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::artifacts::ArtifactStore;
use crate::config::{CheckpointBackend, Config, MatchScorerKind};
use crate::db::create_pool;
use crate::job_search::SerpApiClient;
use crate::llm_client::LlmClient;
use crate::matching::{KeywordMatchScorer, LlmMatchScorer, MatchScorer};
use crate::routes::{build_router, cors_layer};
use crate::speech::DeepgramClient;
use crate::state::{AppState, Services};
use crate::workflow::{Checkpointer, MemoryCheckpointer, PostgresCheckpointer, WorkflowRunner};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting JobMittr API v{} ({:?})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    // PostgreSQL is optional: saved jobs and durable checkpoints need it
    let db = match &config.database_url {
        Some(url) => Some(create_pool(url).await?),
        None => {
            info!("DATABASE_URL not set; saved jobs disabled");
            None
        }
    };

    let checkpointer: Arc<dyn Checkpointer> = match (config.checkpoint_backend, &db) {
        (CheckpointBackend::Postgres, Some(pool)) => {
            Arc::new(PostgresCheckpointer::new(pool.clone()))
        }
        _ => Arc::new(MemoryCheckpointer::new()),
    };
    info!("Checkpointer initialized (backend: {})", checkpointer.backend());

    let llm = LlmClient::new(&config.llm);
    info!("LLM client initialized (model: {})", llm.model());

    let match_scorer: Arc<dyn MatchScorer> = match config.match_scorer {
        MatchScorerKind::Llm => Arc::new(LlmMatchScorer::new(llm.clone())),
        MatchScorerKind::Keyword => Arc::new(KeywordMatchScorer),
    };
    info!("Match scorer initialized (backend: {})", match_scorer.backend());

    let artifacts = match &config.s3 {
        Some(settings) => {
            let store = ArtifactStore::connect(settings).await;
            info!("S3 artifact store initialized (bucket: {})", settings.bucket);
            Some(store)
        }
        None => None,
    };

    let services = Services {
        llm,
        jobs: SerpApiClient::new(&config.serp),
        speech: DeepgramClient::new(&config.deepgram),
        match_scorer,
        artifacts,
    };

    let state = AppState {
        runner: WorkflowRunner::new(services.clone(), checkpointer),
        services,
        db,
        config: config.clone(),
    };

    let cors = cors_layer(&config.cors_origins)?;
    if config.cors_origins.is_empty() {
        info!("CORS_ALLOWED_ORIGINS not set; allowing any origin");
    }

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
