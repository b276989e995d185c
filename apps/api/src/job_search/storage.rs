//! Saved jobs, stored in Postgres (`saved_jobs`).

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::job_search::models::{JobListing, SavedJob};

#[derive(Debug, sqlx::FromRow)]
struct SavedJobRow {
    id: Uuid,
    listing: Json<JobListing>,
    date_saved: DateTime<Utc>,
}

impl From<SavedJobRow> for SavedJob {
    fn from(row: SavedJobRow) -> Self {
        SavedJob {
            id: row.id,
            listing: row.listing.0,
            date_saved: row.date_saved,
        }
    }
}

pub async fn save_job(pool: &PgPool, listing: &JobListing) -> Result<SavedJob> {
    let row = sqlx::query_as::<_, SavedJobRow>(
        r#"
        INSERT INTO saved_jobs (id, title, company, listing)
        VALUES ($1, $2, $3, $4)
        RETURNING id, listing, date_saved
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&listing.title)
    .bind(&listing.company)
    .bind(Json(listing))
    .fetch_one(pool)
    .await?;

    info!("Saved job '{}' at {}", listing.title, listing.company);
    Ok(row.into())
}

/// Newest first.
pub async fn list_saved_jobs(pool: &PgPool) -> Result<Vec<SavedJob>> {
    let rows = sqlx::query_as::<_, SavedJobRow>(
        "SELECT id, listing, date_saved FROM saved_jobs ORDER BY date_saved DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SavedJob::from).collect())
}

/// Deletes the oldest row for a (title, company) pair; later duplicates stay saved.
const REMOVE_SAVED_JOB_SQL: &str = r#"
    DELETE FROM saved_jobs
    WHERE id = (
        SELECT id FROM saved_jobs
        WHERE title = $1 AND company = $2
        ORDER BY date_saved, id
        LIMIT 1
    )
"#;

/// Removes the first saved copy of the (title, company) pair. Returns whether anything was removed.
pub async fn remove_saved_job(pool: &PgPool, title: &str, company: &str) -> Result<bool> {
    let result = sqlx::query(REMOVE_SAVED_JOB_SQL)
        .bind(title)
        .bind(company)
        .execute(pool)
        .await?;

    let removed = result.rows_affected() > 0;
    if removed {
        info!("Removed saved job '{title}' at {company}");
    }
    Ok(removed)
}
