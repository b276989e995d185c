//! Match Scoring: pluggable, trait-based scorer that measures a resume against a job listing.
//!
//! Default: `LlmMatchScorer` (semantic, via Groq).
//! Alternative: `KeywordMatchScorer` (pure-Rust, fast, deterministic, fully testable).
//!
//! `Services` holds an `Arc<dyn MatchScorer>`, chosen at startup via `MATCH_SCORER`.

pub mod prompts;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::job_search::JobListing;
use crate::llm_client::prompts::{fill, join_or_none};
use crate::llm_client::{LlmClient, LlmError};
use crate::matching::prompts::{MATCH_ANALYSIS_PROMPT, MATCH_ANALYSIS_SYSTEM};
use crate::resume::Resume;

const STRONG_STRENGTH: f64 = 1.0;
const PARTIAL_STRENGTH: f64 = 0.6;

// ────────────────────────────────────────────────────────────────────────────
// Output data model (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    /// 0 – 100, two decimals.
    pub match_score: f64,
    #[serde(default)]
    pub key_matches: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// "llm" | "keyword" | "fallback"
    #[serde(default)]
    pub scorer_backend: String,
}

/// Clamps to 0..=100 and rounds to two decimals.
pub fn normalize_score(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    (score.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

/// Analysis used when scoring fails; never blocks the workflow.
pub fn neutral_match(reason: &str) -> MatchAnalysis {
    MatchAnalysis {
        match_score: 50.0,
        key_matches: vec!["Basic qualifications met".to_string()],
        gaps: vec![reason.to_string()],
        recommendations: vec!["Review job requirements manually".to_string()],
        scorer_backend: "fallback".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("LLM match analysis failed: {0}")]
    Llm(#[from] LlmError),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap backends without touching nodes, tools or handlers.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, resume: &Resume, job: &JobListing) -> Result<MatchAnalysis, MatchError>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmMatchScorer: default
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmMatchScorer {
    llm: LlmClient,
}

impl LlmMatchScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[derive(Debug, Deserialize)]
struct LlmMatchResponse {
    match_score: f64,
    #[serde(default)]
    key_matches: Vec<String>,
    #[serde(default)]
    gaps: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(&self, resume: &Resume, job: &JobListing) -> Result<MatchAnalysis, MatchError> {
        let experience: Vec<String> = resume
            .experience
            .iter()
            .map(|e| format!("{} at {}", e.position, e.company))
            .collect();

        let prompt = fill(
            MATCH_ANALYSIS_PROMPT,
            &[
                ("skills", join_or_none(&resume.skill_names()).as_str()),
                ("experience", join_or_none(&experience).as_str()),
                ("job_title", job.title.as_str()),
                ("company", job.company.as_str()),
                ("job_description", job.description.as_str()),
            ],
        );

        let response: LlmMatchResponse = self.llm.call_json(&prompt, MATCH_ANALYSIS_SYSTEM).await?;

        let analysis = MatchAnalysis {
            match_score: normalize_score(response.match_score),
            key_matches: response.key_matches,
            gaps: response.gaps,
            recommendations: response.recommendations,
            scorer_backend: self.backend().to_string(),
        };
        info!(
            "LLM match score for '{}' at {}: {}",
            job.title, job.company, analysis.match_score
        );
        Ok(analysis)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordMatchScorer: deterministic alternative
// ────────────────────────────────────────────────────────────────────────────

/// Pure-Rust keyword scorer. No LLM call.
///
/// Algorithm:
/// 1. For each resume skill:
///    - found in the job title or the requirements part of the description → strength 1.0
///    - found elsewhere in the description → strength 0.6
///    - not found → 0.0, reported as a gap
/// 2. match_score = Σ strength / skill count × 100
pub struct KeywordMatchScorer;

#[async_trait]
impl MatchScorer for KeywordMatchScorer {
    async fn score(&self, resume: &Resume, job: &JobListing) -> Result<MatchAnalysis, MatchError> {
        Ok(compute_keyword_match(resume, job))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

/// Splits a description into (general, requirements). Requirements start at the
/// first line mentioning requirements or qualifications.
fn split_requirements(description: &str) -> (String, String) {
    let lower = description.to_lowercase();
    let marker = ["requirement", "qualification", "what you bring", "must have"]
        .iter()
        .filter_map(|m| lower.find(m))
        .min();

    match marker {
        Some(idx) => {
            let line_start = lower[..idx].rfind('\n').map(|i| i + 1).unwrap_or(0);
            (lower[..line_start].to_string(), lower[line_start..].to_string())
        }
        None => (lower, String::new()),
    }
}

/// Whole-term, case-insensitive search. Terms like "C++" and "C#" keep their symbols.
fn mentions(haystack: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    let pattern = format!(r"(^|[^a-z0-9+#]){}($|[^a-z0-9+#])", regex::escape(&term));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(haystack),
        Err(_) => haystack.contains(&term),
    }
}

fn compute_keyword_match(resume: &Resume, job: &JobListing) -> MatchAnalysis {
    let skills = resume.skill_names();
    if skills.is_empty() {
        return MatchAnalysis {
            match_score: 0.0,
            key_matches: vec![],
            gaps: vec!["Resume lists no skills to compare".to_string()],
            recommendations: vec!["Add a skills section to your resume".to_string()],
            scorer_backend: "keyword".to_string(),
        };
    }

    let title = job.title.to_lowercase();
    let (general, requirements) = split_requirements(&job.description);

    let mut key_matches = Vec::new();
    let mut partial = Vec::new();
    let mut gaps = Vec::new();
    let mut total = 0.0_f64;

    for skill in &skills {
        if mentions(&title, skill) || mentions(&requirements, skill) {
            total += STRONG_STRENGTH;
            key_matches.push(format!("{skill} (required)"));
        } else if mentions(&general, skill) {
            total += PARTIAL_STRENGTH;
            partial.push(skill.clone());
            key_matches.push(format!("{skill} (mentioned)"));
        } else {
            gaps.push(format!("{skill} is not mentioned in the posting"));
        }
    }

    let match_score = normalize_score(total / skills.len() as f64 * 100.0);
    let recommendations = build_recommendations(match_score, &partial, job);

    MatchAnalysis {
        match_score,
        key_matches,
        gaps,
        recommendations,
        scorer_backend: "keyword".to_string(),
    }
}

fn build_recommendations(score: f64, partial: &[String], job: &JobListing) -> Vec<String> {
    let mut recs = Vec::new();
    if score >= 80.0 {
        recs.push(format!(
            "Strong fit for {}. Lead with your matching skills.",
            job.title
        ));
    } else if score >= 50.0 {
        recs.push(format!(
            "Moderate fit ({score}/100). Tailor your summary to the {} requirements.",
            job.title
        ));
    } else {
        recs.push(format!(
            "Low fit ({score}/100). Read the requirements closely before applying."
        ));
    }
    if !partial.is_empty() {
        recs.push(format!(
            "Show concrete experience with: {}.",
            partial.join(", ")
        ));
    }
    recs
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
