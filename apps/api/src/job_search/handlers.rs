//! Axum route handlers for job search and saved jobs.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::job_search::{
    resume_keywords, storage, JobListing, JobQuery, Platform, SavedJob,
};
use crate::resume::Resume;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Falls back to the resume's top skills when empty.
    #[serde(default)]
    pub keywords: String,
    pub location: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub resume: Option<Resume>,
}

impl SearchRequest {
    fn into_query(self) -> Result<JobQuery, AppError> {
        let keywords = match (self.keywords.trim(), &self.resume) {
            ("", Some(resume)) => resume_keywords(resume),
            (keywords, _) => keywords.to_string(),
        };
        if keywords.trim().is_empty() {
            return Err(AppError::Validation(
                "keywords are required when no resume with skills is given".to_string(),
            ));
        }

        let mut query = JobQuery::new(keywords, self.location);
        query.platform = self.platform;
        if let Some(count) = self.count {
            query.count = count;
        }
        Ok(query)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: JobQuery,
    pub count: usize,
    pub jobs: Vec<JobListing>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveSavedQuery {
    pub title: String,
    pub company: String,
}

#[derive(Debug, Serialize)]
pub struct RemoveSavedResponse {
    pub removed: bool,
}

fn saved_jobs_pool(state: &AppState) -> Result<&PgPool, AppError> {
    state.db.as_ref().ok_or_else(|| {
        AppError::Unavailable("Saved jobs need DATABASE_URL to be configured".to_string())
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = request.into_query()?;
    let jobs = state.services.jobs.search(&query).await?;

    Ok(Json(SearchResponse {
        count: jobs.len(),
        query,
        jobs,
    }))
}

/// GET /api/v1/jobs/saved
pub async fn handle_list_saved(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedJob>>, AppError> {
    let pool = saved_jobs_pool(&state)?;
    Ok(Json(storage::list_saved_jobs(pool).await?))
}

/// POST /api/v1/jobs/saved
pub async fn handle_save(
    State(state): State<AppState>,
    Json(listing): Json<JobListing>,
) -> Result<(StatusCode, Json<SavedJob>), AppError> {
    if listing.title.trim().is_empty() || listing.company.trim().is_empty() {
        return Err(AppError::Validation(
            "title and company cannot be empty".to_string(),
        ));
    }
    let pool = saved_jobs_pool(&state)?;
    let saved = storage::save_job(pool, &listing).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// DELETE /api/v1/jobs/saved?title=..&company=..
pub async fn handle_remove_saved(
    State(state): State<AppState>,
    Query(params): Query<RemoveSavedQuery>,
) -> Result<Json<RemoveSavedResponse>, AppError> {
    let pool = saved_jobs_pool(&state)?;
    let removed = storage::remove_saved_job(pool, &params.title, &params.company).await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "No saved job '{}' at {}",
            params.title, params.company
        )));
    }
    Ok(Json(RemoveSavedResponse { removed }))
}
