pub mod feedback;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod questions;
pub mod report;

use thiserror::Error;

use crate::llm_client::LlmError;

pub use feedback::{fallback_feedback, generate_feedback};
pub use models::{InterviewQuestion, InterviewSession, QuestionCategory, QuestionResponse};
pub use questions::{generate_questions, DEFAULT_QUESTIONS};
pub use report::{render_report, report_file_name};

#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("At least one question is required")]
    NoQuestions,

    #[error("Question index {index} is out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("The model returned no interview questions")]
    EmptyQuestions,

    #[error(transparent)]
    Llm(#[from] LlmError),
}
