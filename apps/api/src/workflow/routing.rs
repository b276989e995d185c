//! Routers for conditional edges. Each one is a pure function of the state
//! and always returns one of the labels listed in its doc comment.

use crate::workflow::state::{NextAction, Step, WorkflowState};

/// parse_resume | search_jobs | generate_questions | error
pub fn route_by_intent(state: &WorkflowState) -> &'static str {
    if state.error.is_some() {
        return "error";
    }

    match state.current_step {
        Step::ResumeUpload => "parse_resume",
        Step::JobSearch if state.has_resume_profile() => "search_jobs",
        Step::JobSearch => "parse_resume",
        Step::InterviewPrep if state.selected_job.is_some() => "generate_questions",
        Step::InterviewPrep if state.has_resume_profile() => "search_jobs",
        Step::InterviewPrep => "parse_resume",
        _ => "error",
    }
}

/// job_search | complete | error
pub fn route_after_resume(state: &WorkflowState) -> &'static str {
    if state.error.is_some() || !state.has_resume_profile() {
        return "error";
    }
    if state.user_preferences.auto_job_search && state.job_query.is_some() {
        return "job_search";
    }
    "complete"
}

/// select_job | no_results_end | error
pub fn route_after_search(state: &WorkflowState) -> &'static str {
    if state.error.is_some() {
        return "error";
    }
    if state.job_results.is_empty() {
        return "no_results_end";
    }
    "select_job"
}

/// analyze_match | generate_questions | error
pub fn route_after_job_selection(state: &WorkflowState) -> &'static str {
    if state.error.is_some() || state.selected_job.is_none() {
        return "error";
    }
    match state.user_preferences.next_action {
        NextAction::Interview => "generate_questions",
        NextAction::Analysis => "analyze_match",
    }
}

/// generate_questions | complete | error
pub fn route_after_match_analysis(state: &WorkflowState) -> &'static str {
    if state.error.is_some() || state.match_analysis.is_none() {
        return "error";
    }
    if state.user_preferences.proceed_to_interview {
        return "generate_questions";
    }
    "complete"
}

/// await_input | check_progress | error
pub fn route_after_conduct(state: &WorkflowState) -> &'static str {
    if state.current_step == Step::AwaitingResponse {
        return "await_input";
    }
    if state.error.is_some() {
        return "error";
    }
    "check_progress"
}

/// advance_question | conduct_question | finalize_interview | error
pub fn route_interview_progress(state: &WorkflowState) -> &'static str {
    let Some(session) = &state.interview_session else {
        return "error";
    };

    if session.current_question_index >= session.questions.len() {
        "finalize_interview"
    } else if session.response_for(session.current_question_index).is_some() {
        "advance_question"
    } else {
        "conduct_question"
    }
}
