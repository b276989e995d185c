use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_JOB_COUNT: u32 = 1;
pub const MAX_JOB_COUNT: u32 = 20;
pub const DEFAULT_JOB_COUNT: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    LinkedIn,
    Indeed,
    Glassdoor,
    ZipRecruiter,
    Monster,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::Indeed => "Indeed",
            Platform::Glassdoor => "Glassdoor",
            Platform::ZipRecruiter => "ZipRecruiter",
            Platform::Monster => "Monster",
        }
    }
}

fn default_count() -> u32 {
    DEFAULT_JOB_COUNT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobQuery {
    pub keywords: String,
    pub location: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default = "default_count")]
    pub count: u32,
}

impl JobQuery {
    pub fn new(keywords: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            location: location.into(),
            platform: Platform::default(),
            count: DEFAULT_JOB_COUNT,
        }
    }

    /// Returns every problem with the query. Empty means it can be sent.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.keywords.trim().is_empty() {
            problems.push("keywords must not be empty".to_string());
        }
        if self.location.trim().is_empty() {
            problems.push("location must not be empty".to_string());
        }
        if !(MIN_JOB_COUNT..=MAX_JOB_COUNT).contains(&self.count) {
            problems.push(format!(
                "count must be between {MIN_JOB_COUNT} and {MAX_JOB_COUNT}, got {}",
                self.count
            ));
        }
        problems
    }

    /// The free-text query sent to the search engine.
    pub fn search_text(&self) -> String {
        format!("{} jobs in {}", self.keywords.trim(), self.location.trim())
    }
}

/// A job posting as returned by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub via: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub schedule_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedJob {
    pub id: Uuid,
    #[serde(flatten)]
    pub listing: JobListing,
    pub date_saved: DateTime<Utc>,
}
