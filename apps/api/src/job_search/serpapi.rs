//! SerpAPI client for the `google_jobs` engine.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SerpSettings;
use crate::job_search::models::{JobListing, JobQuery};
use crate::resume::Resume;

#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SERP API error: {0}")]
    Api(String),

    #[error("SERP API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid job query: {0}")]
    InvalidQuery(String),

    #[error("Could not decode SERP API response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    jobs_results: Vec<SerpJob>,
}

#[derive(Debug, Deserialize)]
struct SerpJob {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    via: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    detected_extensions: DetectedExtensions,
    #[serde(default)]
    apply_options: Vec<ApplyOption>,
    #[serde(default)]
    apply_link: Option<ApplyOption>,
    #[serde(default)]
    share_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DetectedExtensions {
    #[serde(default)]
    posted_at: Option<String>,
    #[serde(default)]
    salary: Option<String>,
    #[serde(default)]
    schedule_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApplyOption {
    #[serde(default)]
    link: Option<String>,
}

impl From<SerpJob> for JobListing {
    fn from(job: SerpJob) -> Self {
        let url = job
            .apply_options
            .into_iter()
            .find_map(|o| o.link)
            .or(job.apply_link.and_then(|a| a.link))
            .or(job.share_link);

        JobListing {
            title: job.title.unwrap_or_else(|| "Untitled role".to_string()),
            company: job.company_name.unwrap_or_else(|| "Unknown company".to_string()),
            description: job.description.unwrap_or_default(),
            url,
            location: job.location,
            via: job.via,
            posted_at: job.detected_extensions.posted_at,
            salary: job.detected_extensions.salary,
            schedule_type: job.detected_extensions.schedule_type,
        }
    }
}

#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    engine: String,
}

impl SerpApiClient {
    pub fn new(settings: &SerpSettings) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            engine: settings.engine.clone(),
        }
    }

    /// Runs one search and keeps at most `query.count` listings.
    pub async fn search(&self, query: &JobQuery) -> Result<Vec<JobListing>, JobSearchError> {
        let problems = query.problems();
        if !problems.is_empty() {
            return Err(JobSearchError::InvalidQuery(problems.join("; ")));
        }

        let q = query.search_text();
        info!(
            "Searching jobs: q=\"{q}\" platform={} count={}",
            query.platform.as_str(),
            query.count
        );

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("engine", self.engine.as_str()),
                ("q", q.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // SerpAPI reports most failures as `{"error": "..."}`, sometimes with a 4xx.
        if !status.is_success() {
            let error = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string));
            return Err(match error {
                Some(error) => JobSearchError::Api(error),
                None => JobSearchError::Status {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        let parsed: SerpResponse = serde_json::from_str(&text)?;
        if let Some(error) = parsed.error {
            return Err(JobSearchError::Api(error));
        }

        let listings: Vec<JobListing> = parsed
            .jobs_results
            .into_iter()
            .take(query.count as usize)
            .map(JobListing::from)
            .collect();

        debug!("SERP API returned {} listings", listings.len());
        Ok(listings)
    }
}

/// Search keywords derived from a resume: the first three skill names.
pub fn resume_keywords(resume: &Resume) -> String {
    resume
        .skills
        .iter()
        .take(3)
        .map(|s| s.name.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
