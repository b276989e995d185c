use serde::{Deserialize, Serialize};

use crate::interview::models::DEFAULT_INTERVIEW_TYPE;
use crate::interview::{InterviewQuestion, InterviewSession, DEFAULT_QUESTIONS};
use crate::job_search::{JobListing, JobQuery};
use crate::matching::MatchAnalysis;
use crate::resume::ResumeData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    ResumeUpload,
    ResumeAnalysis,
    JobSearch,
    JobSelection,
    JobSearchComplete,
    MatchAnalysis,
    InterviewPrep,
    InterviewSetup,
    InterviewActive,
    AwaitingResponse,
    InterviewComplete,
    Complete,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ResumeUpload => "resume_upload",
            Step::ResumeAnalysis => "resume_analysis",
            Step::JobSearch => "job_search",
            Step::JobSelection => "job_selection",
            Step::JobSearchComplete => "job_search_complete",
            Step::MatchAnalysis => "match_analysis",
            Step::InterviewPrep => "interview_prep",
            Step::InterviewSetup => "interview_setup",
            Step::InterviewActive => "interview_active",
            Step::AwaitingResponse => "awaiting_response",
            Step::InterviewComplete => "interview_complete",
            Step::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[cfg(test)]
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// What to do once a job has been selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextAction {
    #[default]
    Analysis,
    Interview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub auto_job_search: bool,
    pub next_action: NextAction,
    pub proceed_to_interview: bool,
    pub job_index: usize,
    pub question_count: u32,
    pub interview_type: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            auto_job_search: false,
            next_action: NextAction::Analysis,
            proceed_to_interview: false,
            job_index: 0,
            question_count: DEFAULT_QUESTIONS,
            interview_type: DEFAULT_INTERVIEW_TYPE.to_string(),
        }
    }
}

/// Candidate audio waiting to be transcribed. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// Everything a workflow thread knows. Serialized whole into every checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowState {
    pub resume: Option<ResumeData>,
    pub job_query: Option<JobQuery>,
    pub job_results: Vec<JobListing>,
    pub selected_job: Option<JobListing>,
    pub match_analysis: Option<MatchAnalysis>,
    pub interview_questions: Vec<InterviewQuestion>,
    pub interview_session: Option<InterviewSession>,
    pub current_step: Step,
    pub error: Option<String>,
    pub messages: Vec<Message>,
    pub user_preferences: UserPreferences,
    /// Artifact key of the spoken version of the current question, if uploaded.
    pub question_audio_key: Option<String>,
    #[serde(skip)]
    pub pending_audio: Option<AudioClip>,
}

impl WorkflowState {
    /// Records a node failure and rolls the step back. The first error of a
    /// run is kept so the error handler reports the root cause.
    pub fn fail(&mut self, error: impl Into<String>, step: Step) {
        if self.error.is_none() {
            self.error = Some(error.into());
        }
        self.current_step = step;
    }

    /// Appends an assistant message.
    pub fn say(&mut self, content: impl Into<String>) {
        self.messages.push(Message::ai(content));
    }

    pub fn last_human_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Human)
            .map(|m| m.content.as_str())
    }

    /// A parsed profile is present, not just raw text.
    pub fn has_resume_profile(&self) -> bool {
        self.resume.as_ref().is_some_and(|r| r.profile.is_some())
    }

    /// Applies a partial update: `Some` fields overwrite, messages append.
    pub fn merge(&mut self, input: WorkflowInput) {
        let WorkflowInput {
            resume,
            job_query,
            job_results,
            selected_job,
            match_analysis,
            interview_questions,
            interview_session,
            current_step,
            user_preferences,
            messages,
            audio,
        } = input;

        if let Some(resume) = resume {
            self.resume = Some(resume);
        }
        if let Some(job_query) = job_query {
            self.job_query = Some(job_query);
        }
        if let Some(job_results) = job_results {
            self.job_results = job_results;
        }
        if let Some(selected_job) = selected_job {
            self.selected_job = Some(selected_job);
        }
        if let Some(match_analysis) = match_analysis {
            self.match_analysis = Some(match_analysis);
        }
        if let Some(questions) = interview_questions {
            self.interview_questions = questions;
        }
        if let Some(session) = interview_session {
            self.interview_session = Some(session);
        }
        if let Some(step) = current_step {
            self.current_step = step;
        }
        if let Some(prefs) = user_preferences {
            self.user_preferences = prefs;
        }
        if let Some(audio) = audio {
            self.pending_audio = Some(audio);
        }
        self.messages.extend(messages);
    }
}

/// Partial update applied to the checkpointed state before a run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowInput {
    pub resume: Option<ResumeData>,
    pub job_query: Option<JobQuery>,
    pub job_results: Option<Vec<JobListing>>,
    pub selected_job: Option<JobListing>,
    pub match_analysis: Option<MatchAnalysis>,
    pub interview_questions: Option<Vec<InterviewQuestion>>,
    pub interview_session: Option<InterviewSession>,
    pub current_step: Option<Step>,
    pub user_preferences: Option<UserPreferences>,
    pub messages: Vec<Message>,
    #[serde(skip)]
    pub audio: Option<AudioClip>,
}

/// Returns every problem with the state's job query.
pub fn validate_state(state: &WorkflowState) -> Vec<String> {
    state
        .job_query
        .as_ref()
        .map(JobQuery::problems)
        .unwrap_or_default()
}
