use tracing::{info, warn};

use crate::job_search::SerpApiClient;
use crate::matching::{neutral_match, MatchScorer};
use crate::workflow::state::{Step, WorkflowState};

pub async fn search_jobs(state: &mut WorkflowState, client: &SerpApiClient) {
    let query = state
        .job_query
        .clone()
        .filter(|q| !q.keywords.trim().is_empty() && !q.location.trim().is_empty());

    let Some(query) = query else {
        state.job_results.clear();
        state.fail(
            "Job query missing required fields (keywords, location)",
            Step::JobSearch,
        );
        return;
    };

    match client.search(&query).await {
        Ok(jobs) => {
            info!("Job search returned {} results", jobs.len());
            state.job_results = jobs;
            state.current_step = Step::JobSelection;
        }
        Err(e) => {
            state.job_results.clear();
            state.fail(format!("Job search failed: {e}"), Step::JobSearch);
        }
    }
}

/// Picks `user_preferences.job_index`, falling back to the first result when out of range.
pub fn select_job(state: &mut WorkflowState) {
    if state.job_results.is_empty() {
        state.selected_job = None;
        state.fail("No job results available for selection", Step::JobSearch);
        return;
    }

    let requested = state.user_preferences.job_index;
    let index = if requested < state.job_results.len() {
        requested
    } else {
        0
    };

    state.selected_job = Some(state.job_results[index].clone());
    state.current_step = Step::MatchAnalysis;
}

pub fn no_results_handler(state: &mut WorkflowState) {
    let (keywords, location) = state
        .job_query
        .as_ref()
        .map(|q| (q.keywords.clone(), q.location.clone()))
        .unwrap_or_else(|| {
            (
                "specified criteria".to_string(),
                "specified location".to_string(),
            )
        });

    state.error = None;
    state.current_step = Step::JobSearchComplete;
    state.say(format!(
        "No jobs found for '{keywords}' in '{location}'. Try different keywords or location."
    ));
}

/// Scoring failures fall back to a neutral analysis instead of an error.
pub async fn analyze_match(state: &mut WorkflowState, scorer: &dyn MatchScorer) {
    let Some(profile) = state.resume.as_ref().and_then(|r| r.profile.clone()) else {
        state.match_analysis = None;
        state.fail(
            "Resume data not available for match analysis",
            Step::ResumeUpload,
        );
        return;
    };
    let Some(job) = state.selected_job.clone() else {
        state.match_analysis = None;
        state.fail("No job selected for match analysis", Step::JobSelection);
        return;
    };

    let analysis = match scorer.score(&profile, &job).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Match scoring ({}) failed: {e}", scorer.backend());
            neutral_match(&format!("Unable to perform detailed analysis: {e}"))
        }
    };

    info!(
        "Match score for '{}' at {}: {} ({})",
        job.title, job.company, analysis.match_score, analysis.scorer_backend
    );
    state.match_analysis = Some(analysis);
    state.current_step = Step::InterviewPrep;
}
