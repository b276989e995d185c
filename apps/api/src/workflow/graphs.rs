//! The four compiled graphs: three focused flows and the master graph that
//! wires them together behind the intent classifier.

use crate::workflow::graph::{Graph, GraphKind, NodeId, Target};
use crate::workflow::routing::{
    route_after_conduct, route_after_job_selection, route_after_match_analysis,
    route_after_resume, route_after_search, route_by_intent, route_interview_progress,
};

use crate::workflow::graph::NodeId::*;

const fn node(id: NodeId) -> Target {
    Target::Node(id)
}

impl GraphKind {
    pub fn build(&self) -> Graph {
        match self {
            GraphKind::Master => master_graph(),
            GraphKind::Resume => resume_graph(),
            GraphKind::Job => job_graph(),
            GraphKind::Interview => interview_graph(),
        }
    }
}

/// parse → analyze → validate → END
pub fn resume_graph() -> Graph {
    Graph::new(GraphKind::Resume, ParseResume)
        .edge(ParseResume, node(AnalyzeResume))
        .edge(AnalyzeResume, node(ValidateResume))
        .edge(ValidateResume, Target::End)
}

/// search → select → match → END, with a no-results branch.
pub fn job_graph() -> Graph {
    Graph::new(GraphKind::Job, SearchJobs)
        .conditional(
            SearchJobs,
            "route_after_search",
            route_after_search,
            &[
                ("select_job", node(SelectJob)),
                ("no_results_end", node(NoResultsHandler)),
                ("error", Target::End),
            ],
        )
        .edge(SelectJob, node(AnalyzeMatch))
        .conditional(
            AnalyzeMatch,
            "route_after_match_analysis",
            route_after_match_analysis,
            &[
                ("generate_questions", Target::End),
                ("complete", Target::End),
                ("error", Target::End),
            ],
        )
        .edge(NoResultsHandler, Target::End)
}

/// Question generation and the ask / answer / advance loop. The run pauses
/// at `await_input` until the candidate's audio arrives.
pub fn interview_graph() -> Graph {
    Graph::new(GraphKind::Interview, GenerateQuestions)
        .edge(GenerateQuestions, node(InitializeSession))
        .edge(InitializeSession, node(ConductQuestion))
        .conditional(
            ConductQuestion,
            "route_after_conduct",
            route_after_conduct,
            &[
                ("await_input", node(AwaitInput)),
                ("check_progress", node(CheckProgress)),
                ("error", Target::End),
            ],
        )
        .edge(AwaitInput, node(ConductQuestion))
        .interrupt(AwaitInput, ConductQuestion)
        .conditional(
            CheckProgress,
            "route_interview_progress",
            route_interview_progress,
            &[
                ("advance_question", node(AdvanceQuestion)),
                ("conduct_question", node(ConductQuestion)),
                ("finalize_interview", node(FinalizeInterview)),
                ("error", Target::End),
            ],
        )
        .edge(AdvanceQuestion, node(CheckProgress))
        .edge(FinalizeInterview, Target::End)
}

pub fn master_graph() -> Graph {
    Graph::new(GraphKind::Master, IntentClassifier)
        .conditional(
            IntentClassifier,
            "route_by_intent",
            route_by_intent,
            &[
                ("parse_resume", node(ParseResume)),
                ("search_jobs", node(SearchJobs)),
                ("generate_questions", node(GenerateQuestions)),
                ("error", node(ErrorHandler)),
            ],
        )
        // resume
        .edge(ParseResume, node(AnalyzeResume))
        .edge(AnalyzeResume, node(ValidateResume))
        .conditional(
            ValidateResume,
            "route_after_resume",
            route_after_resume,
            &[
                ("job_search", node(SearchJobs)),
                ("complete", node(WorkflowComplete)),
                ("error", node(ErrorHandler)),
            ],
        )
        // jobs
        .conditional(
            SearchJobs,
            "route_after_search",
            route_after_search,
            &[
                ("select_job", node(SelectJob)),
                ("no_results_end", node(NoResultsHandler)),
                ("error", node(ErrorHandler)),
            ],
        )
        .conditional(
            SelectJob,
            "route_after_job_selection",
            route_after_job_selection,
            &[
                ("analyze_match", node(AnalyzeMatch)),
                ("generate_questions", node(GenerateQuestions)),
                ("error", node(ErrorHandler)),
            ],
        )
        .conditional(
            AnalyzeMatch,
            "route_after_match_analysis",
            route_after_match_analysis,
            &[
                ("generate_questions", node(GenerateQuestions)),
                ("complete", node(WorkflowComplete)),
                ("error", node(ErrorHandler)),
            ],
        )
        .edge(NoResultsHandler, node(WorkflowComplete))
        // interview
        .edge(GenerateQuestions, node(InitializeSession))
        .edge(InitializeSession, node(ConductQuestion))
        .conditional(
            ConductQuestion,
            "route_after_conduct",
            route_after_conduct,
            &[
                ("await_input", node(AwaitInput)),
                ("check_progress", node(CheckProgress)),
                ("error", node(ErrorHandler)),
            ],
        )
        .edge(AwaitInput, node(ConductQuestion))
        .interrupt(AwaitInput, ConductQuestion)
        .conditional(
            CheckProgress,
            "route_interview_progress",
            route_interview_progress,
            &[
                ("advance_question", node(AdvanceQuestion)),
                ("conduct_question", node(ConductQuestion)),
                ("finalize_interview", node(FinalizeInterview)),
                ("error", node(ErrorHandler)),
            ],
        )
        .edge(AdvanceQuestion, node(CheckProgress))
        .edge(FinalizeInterview, node(WorkflowComplete))
        // completion
        .edge(ErrorHandler, node(WorkflowComplete))
        .edge(WorkflowComplete, Target::End)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::state::{Step, WorkflowState};

    #[test]
    fn test_entries() {
        assert_eq!(GraphKind::Master.build().entry(), IntentClassifier);
        assert_eq!(GraphKind::Resume.build().entry(), ParseResume);
        assert_eq!(GraphKind::Job.build().entry(), SearchJobs);
        assert_eq!(GraphKind::Interview.build().entry(), GenerateQuestions);
    }

    #[test]
    fn test_master_contains_every_node() {
        let graph = master_graph();
        for id in NodeId::ALL {
            assert!(graph.contains(id), "master graph is missing {id}");
        }
    }

    #[test]
    fn test_resume_graph_is_linear() {
        let graph = resume_graph();
        let state = WorkflowState::default();
        assert_eq!(graph.next(ParseResume, &state).unwrap(), node(AnalyzeResume));
        assert_eq!(graph.next(AnalyzeResume, &state).unwrap(), node(ValidateResume));
        assert_eq!(graph.next(ValidateResume, &state).unwrap(), Target::End);
        assert!(!graph.contains(SearchJobs));
    }

    #[test]
    fn test_search_error_ends_job_graph_but_is_handled_in_master() {
        let state = WorkflowState {
            error: Some("Job search failed: boom".to_string()),
            ..WorkflowState::default()
        };
        assert_eq!(job_graph().next(SearchJobs, &state).unwrap(), Target::End);
        assert_eq!(
            master_graph().next(SearchJobs, &state).unwrap(),
            node(ErrorHandler)
        );
    }

    #[test]
    fn test_await_input_is_an_interrupt() {
        for graph in [interview_graph(), master_graph()] {
            assert_eq!(graph.resume_point(AwaitInput), Some(ConductQuestion));
            assert_eq!(graph.resume_point(ConductQuestion), None);
        }

        let waiting = WorkflowState {
            current_step: Step::AwaitingResponse,
            ..WorkflowState::default()
        };
        assert_eq!(
            interview_graph().next(ConductQuestion, &waiting).unwrap(),
            node(AwaitInput)
        );
    }

    #[test]
    fn test_advance_goes_back_through_progress_check() {
        let state = WorkflowState::default();
        assert_eq!(
            interview_graph().next(AdvanceQuestion, &state).unwrap(),
            node(CheckProgress)
        );
    }
}
