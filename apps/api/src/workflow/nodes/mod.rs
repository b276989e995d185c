//! Node implementations. Nodes never return errors: failures are written to
//! `state.error` with a step rollback and left to the routers.

pub mod interview;
pub mod jobs;
pub mod orchestration;
pub mod resume;

use crate::state::Services;
use crate::workflow::graph::NodeId;
use crate::workflow::state::{Step, WorkflowState};

/// What a node may touch besides the state.
pub struct NodeEnv<'a> {
    pub services: &'a Services,
    pub thread_id: &'a str,
}

pub async fn run_node(node: NodeId, state: &mut WorkflowState, env: &NodeEnv<'_>) {
    let services = env.services;
    match node {
        NodeId::IntentClassifier => orchestration::intent_classifier(state, &services.llm).await,
        NodeId::ParseResume => resume::parse_resume(state, &services.llm).await,
        NodeId::AnalyzeResume => resume::analyze_resume(state, &services.llm).await,
        NodeId::ValidateResume => resume::validate_resume(state),
        NodeId::SearchJobs => jobs::search_jobs(state, &services.jobs).await,
        NodeId::SelectJob => jobs::select_job(state),
        NodeId::NoResultsHandler => jobs::no_results_handler(state),
        NodeId::AnalyzeMatch => jobs::analyze_match(state, services.match_scorer.as_ref()).await,
        NodeId::GenerateQuestions => interview::generate_questions(state, &services.llm).await,
        NodeId::InitializeSession => interview::initialize_session(state),
        NodeId::ConductQuestion => interview::conduct_question(state, env).await,
        NodeId::AwaitInput => state.current_step = Step::AwaitingResponse,
        NodeId::CheckProgress => {}
        NodeId::AdvanceQuestion => interview::advance_question(state),
        NodeId::FinalizeInterview => interview::finalize_interview(state),
        NodeId::ErrorHandler => orchestration::error_handler(state),
        NodeId::WorkflowComplete => orchestration::workflow_complete(state),
    }
}
