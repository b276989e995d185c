//! Tool-choosing agent: one model call picks a tool, the executor runs it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::FunctionSpec;
use crate::state::Services;
use crate::tools::definitions::tool_registry;
use crate::tools::executor::execute_tool;
use crate::tools::prompts::{
    INTERVIEW_AGENT_PROMPT, INTERVIEW_PREP_AGENT_PROMPT, JOB_SEARCH_AGENT_PROMPT,
    MATCH_ANALYSIS_AGENT_PROMPT,
};
use crate::tools::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    JobSearch,
    MatchAnalysis,
    InterviewPrep,
    Interview,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::JobSearch => "job_search",
            AgentKind::MatchAnalysis => "match_analysis",
            AgentKind::InterviewPrep => "interview_prep",
            AgentKind::Interview => "interview",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            AgentKind::JobSearch => JOB_SEARCH_AGENT_PROMPT,
            AgentKind::MatchAnalysis => MATCH_ANALYSIS_AGENT_PROMPT,
            AgentKind::InterviewPrep => INTERVIEW_PREP_AGENT_PROMPT,
            AgentKind::Interview => INTERVIEW_AGENT_PROMPT,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "job_search" => Ok(AgentKind::JobSearch),
            "match_analysis" => Ok(AgentKind::MatchAnalysis),
            "interview_prep" => Ok(AgentKind::InterviewPrep),
            "interview" => Ok(AgentKind::Interview),
            _ => Err(ToolError::UnknownAgent(s.to_string())),
        }
    }
}

/// Result envelope returned to callers whether or not a tool ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentOutcome {
    fn failed(tool: Option<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            tool,
            result: None,
            error: Some(error.into()),
        }
    }
}

pub struct AutonomousAgent {
    kind: AgentKind,
    services: Services,
    tools: Vec<FunctionSpec>,
}

impl AutonomousAgent {
    /// Every agent is offered the full registry; only the system prompt differs.
    pub fn new(kind: AgentKind, services: Services) -> Self {
        Self {
            kind,
            services,
            tools: tool_registry(),
        }
    }

    fn user_message(request: &str, context: Option<&Value>) -> String {
        let context = match context {
            Some(value) if !value.is_null() => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            _ => "No additional context".to_string(),
        };
        format!("Request: {request}\n\nContext:\n{context}")
    }

    /// Lets the model pick one tool for `request`, then runs it.
    /// Failures are reported in the outcome, never as an `Err`.
    pub async fn decide_and_execute(&self, request: &str, context: Option<&Value>) -> AgentOutcome {
        let message = Self::user_message(request, context);

        let call = match self
            .services
            .llm
            .call_with_tools(self.kind.system_prompt(), &message, &self.tools)
            .await
        {
            Ok(Some(call)) => call,
            Ok(None) => return AgentOutcome::failed(None, "No tool selected by agent"),
            Err(e) => {
                warn!("{} agent could not choose a tool: {e}", self.kind);
                return AgentOutcome::failed(None, format!("Agent decision failed: {e}"));
            }
        };

        info!("{} agent selected tool '{}'", self.kind, call.name);
        match execute_tool(&call.name, call.arguments, &self.services).await {
            Ok(result) => AgentOutcome {
                success: true,
                tool: Some(call.name),
                result: Some(result),
                error: None,
            },
            Err(e) => {
                warn!("Tool '{}' failed: {e}", call.name);
                AgentOutcome::failed(Some(call.name), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockProviders, MockReply};
    use serde_json::json;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Job_Search".parse::<AgentKind>().unwrap(), AgentKind::JobSearch);
        assert_eq!("interview".parse::<AgentKind>().unwrap(), AgentKind::Interview);
        assert!(matches!(
            "recruiter".parse::<AgentKind>(),
            Err(ToolError::UnknownAgent(_))
        ));
    }

    #[test]
    fn test_user_message_layout() {
        let message = AutonomousAgent::user_message("find jobs", Some(&json!({"city": "Pune"})));
        assert_eq!(
            message,
            "Request: find jobs\n\nContext:\n{\n  \"city\": \"Pune\"\n}"
        );
        assert!(AutonomousAgent::user_message("hi", None).ends_with("No additional context"));
    }

    #[tokio::test]
    async fn test_agent_runs_selected_tool() {
        let mock = MockProviders::start().await;
        mock.push_chat_tool_call(
            "search_jobs",
            json!({"keywords": "rust", "location": "Berlin", "count": 1}),
        );
        mock.push_serp(MockReply::json(json!({
            "jobs_results": [{"title": "Rust Engineer", "company_name": "Ferrous Labs"}]
        })));

        let agent = AutonomousAgent::new(AgentKind::JobSearch, mock.services());
        let outcome = agent
            .decide_and_execute("Find rust jobs in Berlin", None)
            .await;

        assert!(outcome.success, "{outcome:?}");
        assert_eq!(outcome.tool.as_deref(), Some("search_jobs"));
        assert_eq!(outcome.result.unwrap()[0]["title"], "Rust Engineer");

        let chat = mock.requests_to("/chat/completions")[0].json();
        assert_eq!(chat["tool_choice"], "auto");
        assert_eq!(chat["tools"].as_array().unwrap().len(), 7);
        assert_eq!(chat["messages"][0]["content"], JOB_SEARCH_AGENT_PROMPT);
    }

    #[tokio::test]
    async fn test_agent_without_tool_choice() {
        let mock = MockProviders::start().await;
        mock.push_chat_text("I can't help with that.");

        let agent = AutonomousAgent::new(AgentKind::Interview, mock.services());
        let outcome = agent.decide_and_execute("tell me a joke", None).await;

        assert_eq!(
            outcome,
            AgentOutcome {
                success: false,
                tool: None,
                result: None,
                error: Some("No tool selected by agent".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_agent_reports_tool_failure() {
        let mock = MockProviders::start().await;
        mock.push_chat_tool_call("delete_account", json!({}));

        let agent = AutonomousAgent::new(AgentKind::MatchAnalysis, mock.services());
        let outcome = agent.decide_and_execute("remove me", None).await;

        assert!(!outcome.success);
        assert_eq!(outcome.tool.as_deref(), Some("delete_account"));
        assert_eq!(outcome.error.as_deref(), Some("Unknown tool: delete_account"));
    }
}
