//! Workflow orchestrator: a small graph interpreter over `WorkflowState`,
//! checkpointed after every node so a thread can be paused and resumed.

pub mod checkpoint;
pub mod graph;
pub mod graphs;
pub mod handlers;
pub mod nodes;
pub mod prompts;
pub mod routing;
pub mod runner;
pub mod state;

use thiserror::Error;

pub use checkpoint::{Checkpoint, Checkpointer, MemoryCheckpointer, PostgresCheckpointer};
pub use graph::{GraphKind, NodeId};
pub use runner::{RunOutcome, WorkflowRunner};
pub use state::{validate_state, AudioClip, UserPreferences, WorkflowInput, WorkflowState};

pub const RECURSION_LIMIT: usize = 25;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Router '{router}' returned unmapped label '{label}'")]
    UnmappedRoute { router: &'static str, label: String },

    #[error("Recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),

    #[error("No checkpoint found for thread '{0}'")]
    ThreadNotFound(String),

    #[error("Unknown graph '{0}' (expected master, resume, job or interview)")]
    UnknownGraph(String),

    #[error("Invalid workflow state: {0}")]
    InvalidState(String),

    #[error("Checkpoint store error: {0}")]
    Checkpoint(#[from] anyhow::Error),
}

fn slug(value: &str) -> String {
    value.to_lowercase().replace(' ', "_")
}

/// `interview_{user}_{job title lowercased, spaces as underscores}`
pub fn interview_thread_id(job_title: &str, user: &str) -> String {
    format!("interview_{user}_{}", slug(job_title))
}

/// `workflow_{user}_{kind}`
pub fn workflow_thread_id(kind: GraphKind, user: &str) -> String {
    format!("workflow_{user}_{}", kind.as_str())
}

/// Human-readable one-line-per-fact summary of a checkpointed state.
pub fn format_checkpoint_summary(state: &WorkflowState) -> String {
    let mut summary = vec![format!("Current Step: {}", state.current_step.as_str())];

    if let Some(profile) = state.resume.as_ref().and_then(|r| r.profile.as_ref()) {
        summary.push(format!("Resume: {}", profile.name));
    }
    if !state.job_results.is_empty() {
        summary.push(format!("Jobs Found: {}", state.job_results.len()));
    }
    if let Some(job) = &state.selected_job {
        summary.push(format!("Selected Job: {}", job.title));
    }
    if let Some(session) = &state.interview_session {
        summary.push(format!(
            "Interview Progress: {}/{} questions",
            session.responses.len(),
            session.questions.len()
        ));
        summary.push(format!(
            "Current Question Index: {}",
            session.current_question_index
        ));
    }
    if let Some(error) = &state.error {
        summary.push(format!("Error: {error}"));
    }

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::{models::DEFAULT_INTERVIEW_TYPE, InterviewSession};
    use crate::resume::ResumeData;
    use crate::test_utils::{sample_listing, sample_questions, sample_resume};
    use crate::workflow::state::Step;

    #[test]
    fn test_thread_ids() {
        assert_eq!(
            interview_thread_id("Senior Rust Engineer", "priya"),
            "interview_priya_senior_rust_engineer"
        );
        // Surrounding spaces become underscores too
        assert_eq!(
            interview_thread_id(" Rust Engineer ", "priya"),
            "interview_priya__rust_engineer_"
        );
        assert_eq!(
            workflow_thread_id(GraphKind::Job, "priya"),
            "workflow_priya_job"
        );
    }

    #[test]
    fn test_summary_of_empty_state() {
        assert_eq!(
            format_checkpoint_summary(&WorkflowState::default()),
            "Current Step: resume_upload"
        );
    }

    #[test]
    fn test_summary_lists_progress() {
        let mut resume = ResumeData::from_text("raw");
        resume.profile = Some(sample_resume());
        let mut session = InterviewSession::start(
            "Senior Rust Engineer",
            "Ferrous Labs",
            DEFAULT_INTERVIEW_TYPE,
            sample_questions(4),
        )
        .unwrap();
        session.current_question_index = 2;

        let state = WorkflowState {
            resume: Some(resume),
            job_results: vec![sample_listing(), sample_listing()],
            selected_job: Some(sample_listing()),
            interview_session: Some(session),
            current_step: Step::AwaitingResponse,
            error: Some("boom".to_string()),
            ..WorkflowState::default()
        };

        assert_eq!(
            format_checkpoint_summary(&state),
            "Current Step: awaiting_response\n\
             Resume: Priya Raman\n\
             Jobs Found: 2\n\
             Selected Job: Senior Rust Engineer\n\
             Interview Progress: 0/4 questions\n\
             Current Question Index: 2\n\
             Error: boom"
        );
    }
}
