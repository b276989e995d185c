use std::sync::Arc;

use sqlx::PgPool;

use crate::artifacts::ArtifactStore;
use crate::config::Config;
use crate::job_search::SerpApiClient;
use crate::llm_client::LlmClient;
use crate::matching::MatchScorer;
use crate::speech::DeepgramClient;
use crate::workflow::WorkflowRunner;

/// Provider clients shared by workflow nodes, tools and handlers.
#[derive(Clone)]
pub struct Services {
    pub llm: LlmClient,
    pub jobs: SerpApiClient,
    pub speech: DeepgramClient,
    /// Pluggable match scorer. Default: LlmMatchScorer. Swap via MATCH_SCORER env.
    pub match_scorer: Arc<dyn MatchScorer>,
    /// None when S3 is not configured; audio and reports are then only returned inline.
    pub artifacts: Option<ArtifactStore>,
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Owns the checkpointer; shared so per-thread run locks are shared too.
    pub runner: WorkflowRunner,
    /// Saved jobs need Postgres; None when DATABASE_URL is unset.
    pub db: Option<PgPool>,
    pub config: Config,
}
