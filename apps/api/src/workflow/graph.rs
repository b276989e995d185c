use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::workflow::state::WorkflowState;
use crate::workflow::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    IntentClassifier,
    ParseResume,
    AnalyzeResume,
    ValidateResume,
    SearchJobs,
    SelectJob,
    NoResultsHandler,
    AnalyzeMatch,
    GenerateQuestions,
    InitializeSession,
    ConductQuestion,
    AwaitInput,
    CheckProgress,
    AdvanceQuestion,
    FinalizeInterview,
    ErrorHandler,
    WorkflowComplete,
}

impl NodeId {
    pub const ALL: [NodeId; 17] = [
        NodeId::IntentClassifier,
        NodeId::ParseResume,
        NodeId::AnalyzeResume,
        NodeId::ValidateResume,
        NodeId::SearchJobs,
        NodeId::SelectJob,
        NodeId::NoResultsHandler,
        NodeId::AnalyzeMatch,
        NodeId::GenerateQuestions,
        NodeId::InitializeSession,
        NodeId::ConductQuestion,
        NodeId::AwaitInput,
        NodeId::CheckProgress,
        NodeId::AdvanceQuestion,
        NodeId::FinalizeInterview,
        NodeId::ErrorHandler,
        NodeId::WorkflowComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::IntentClassifier => "intent_classifier",
            NodeId::ParseResume => "parse_resume",
            NodeId::AnalyzeResume => "analyze_resume",
            NodeId::ValidateResume => "validate_resume",
            NodeId::SearchJobs => "search_jobs",
            NodeId::SelectJob => "select_job",
            NodeId::NoResultsHandler => "no_results_handler",
            NodeId::AnalyzeMatch => "analyze_match",
            NodeId::GenerateQuestions => "generate_questions",
            NodeId::InitializeSession => "initialize_session",
            NodeId::ConductQuestion => "conduct_question",
            NodeId::AwaitInput => "await_input",
            NodeId::CheckProgress => "check_progress",
            NodeId::AdvanceQuestion => "advance_question",
            NodeId::FinalizeInterview => "finalize_interview",
            NodeId::ErrorHandler => "error_handler",
            NodeId::WorkflowComplete => "workflow_complete",
        }
    }

    pub fn parse(name: &str) -> Option<NodeId> {
        NodeId::ALL.into_iter().find(|n| n.as_str() == name)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Master,
    Resume,
    Job,
    Interview,
}

impl GraphKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphKind::Master => "master",
            GraphKind::Resume => "resume",
            GraphKind::Job => "job",
            GraphKind::Interview => "interview",
        }
    }
}

impl FromStr for GraphKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "master" => Ok(GraphKind::Master),
            "resume" => Ok(GraphKind::Resume),
            "job" => Ok(GraphKind::Job),
            "interview" => Ok(GraphKind::Interview),
            other => Err(WorkflowError::UnknownGraph(other.to_string())),
        }
    }
}

/// Where an edge leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    End,
}

/// A router inspects the state and returns a branch label.
pub type Router = fn(&WorkflowState) -> &'static str;

#[derive(Clone)]
pub enum Edge {
    Direct(Target),
    Conditional {
        name: &'static str,
        router: Router,
        branches: Vec<(&'static str, Target)>,
    },
}

/// A compiled workflow graph: an entry node, outgoing edges per node, and
/// interrupt nodes that pause the run until the next invocation.
#[derive(Clone)]
pub struct Graph {
    kind: GraphKind,
    entry: NodeId,
    edges: HashMap<NodeId, Edge>,
    /// interrupt node -> node to resume at
    interrupts: HashMap<NodeId, NodeId>,
}

impl Graph {
    pub fn new(kind: GraphKind, entry: NodeId) -> Self {
        Self {
            kind,
            entry,
            edges: HashMap::new(),
            interrupts: HashMap::new(),
        }
    }

    pub fn edge(mut self, from: NodeId, to: Target) -> Self {
        self.edges.insert(from, Edge::Direct(to));
        self
    }

    pub fn conditional(
        mut self,
        from: NodeId,
        name: &'static str,
        router: Router,
        branches: &[(&'static str, Target)],
    ) -> Self {
        self.edges.insert(
            from,
            Edge::Conditional {
                name,
                router,
                branches: branches.to_vec(),
            },
        );
        self
    }

    /// Reaching `node` pauses the run; the next invocation resumes at `resume_at`.
    pub fn interrupt(mut self, node: NodeId, resume_at: NodeId) -> Self {
        self.interrupts.insert(node, resume_at);
        self
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn resume_point(&self, node: NodeId) -> Option<NodeId> {
        self.interrupts.get(&node).copied()
    }

    /// Every node reachable as a source or destination of an edge.
    pub fn contains(&self, node: NodeId) -> bool {
        node == self.entry
            || self.edges.contains_key(&node)
            || self.interrupts.contains_key(&node)
            || self.edges.values().any(|edge| match edge {
                Edge::Direct(Target::Node(n)) => *n == node,
                Edge::Direct(Target::End) => false,
                Edge::Conditional { branches, .. } => {
                    branches.iter().any(|(_, t)| *t == Target::Node(node))
                }
            })
    }

    /// Resolves the edge leaving `from`. A node without an outgoing edge leads to END.
    pub fn next(&self, from: NodeId, state: &WorkflowState) -> Result<Target, WorkflowError> {
        match self.edges.get(&from) {
            None => Ok(Target::End),
            Some(Edge::Direct(target)) => Ok(*target),
            Some(Edge::Conditional {
                name,
                router,
                branches,
            }) => {
                let label = router(state);
                branches
                    .iter()
                    .find(|(l, _)| *l == label)
                    .map(|(_, target)| *target)
                    .ok_or_else(|| WorkflowError::UnmappedRoute {
                        router: *name,
                        label: label.to_string(),
                    })
            }
        }
    }
}
