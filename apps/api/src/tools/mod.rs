//! Function-calling tools over the provider clients, plus the agent that
//! lets the model choose among them.

pub mod agent;
pub mod definitions;
pub mod executor;
pub mod handlers;
pub mod prompts;

use thiserror::Error;

use crate::interview::InterviewError;
use crate::job_search::JobSearchError;
use crate::llm_client::LlmError;
use crate::matching::MatchError;
use crate::speech::SpeechError;

pub use agent::{AgentKind, AgentOutcome, AutonomousAgent};
pub use executor::execute_tool;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown agent '{0}' (expected job_search, match_analysis, interview_prep or interview)")]
    UnknownAgent(String),

    #[error("Invalid parameters for '{tool}': {reason}")]
    InvalidParams { tool: String, reason: String },

    #[error("Invalid base64 audio: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Search(#[from] JobSearchError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error(transparent)]
    Interview(#[from] InterviewError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Could not encode tool result: {0}")]
    Serialize(#[from] serde_json::Error),
}
