use serde::Deserialize;
use tracing::info;

use crate::interview::models::InterviewQuestion;
use crate::interview::prompts::{QUESTION_GENERATION_PROMPT, QUESTION_GENERATION_SYSTEM};
use crate::interview::InterviewError;
use crate::job_search::JobListing;
use crate::llm_client::prompts::{fill, join_or_none};
use crate::llm_client::LlmClient;
use crate::resume::Resume;

pub const MIN_QUESTIONS: u32 = 5;
pub const MAX_QUESTIONS: u32 = 20;
pub const DEFAULT_QUESTIONS: u32 = 10;

/// Models sometimes wrap the array in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionPayload {
    List(Vec<InterviewQuestion>),
    Wrapped { questions: Vec<InterviewQuestion> },
}

pub fn clamp_question_count(count: u32) -> u32 {
    count.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
}

fn describe_candidate(resume: Option<&Resume>) -> String {
    match resume {
        Some(resume) => {
            let roles: Vec<String> = resume
                .experience
                .iter()
                .map(|e| format!("{} at {}", e.position, e.company))
                .collect();
            format!(
                "Skills: {}\nExperience: {}\nSummary: {}",
                join_or_none(&resume.skill_names()),
                join_or_none(&roles),
                resume.summary
            )
        }
        None => "Not provided. Ask questions suitable for a typical applicant.".to_string(),
    }
}

/// Generates `count` questions (clamped to 5..=20) for a job.
pub async fn generate_questions(
    job: &JobListing,
    resume: Option<&Resume>,
    count: u32,
    llm: &LlmClient,
) -> Result<Vec<InterviewQuestion>, InterviewError> {
    let count = clamp_question_count(count);

    let prompt = fill(
        QUESTION_GENERATION_PROMPT,
        &[
            ("count", count.to_string().as_str()),
            ("job_title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("job_description", job.description.as_str()),
            ("candidate", describe_candidate(resume).as_str()),
        ],
    );

    let payload: QuestionPayload = llm.call_json(&prompt, QUESTION_GENERATION_SYSTEM).await?;
    let mut questions = match payload {
        QuestionPayload::List(questions) => questions,
        QuestionPayload::Wrapped { questions } => questions,
    };

    questions.retain(|q| !q.question.trim().is_empty());
    if questions.is_empty() {
        return Err(InterviewError::EmptyQuestions);
    }
    questions.truncate(count as usize);

    info!(
        "Generated {} interview questions for '{}' at {}",
        questions.len(),
        job.title,
        job.company
    );
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::QuestionCategory;
    use crate::test_utils::{sample_listing, sample_resume, MockProviders};
    use serde_json::json;

    fn question_json(n: usize) -> serde_json::Value {
        json!((0..n)
            .map(|i| json!({
                "question": format!("Question number {i}?"),
                "category": "Technical",
                "tips": "Be concise"
            }))
            .collect::<Vec<_>>())
    }

    #[test]
    fn test_count_clamped() {
        assert_eq!(clamp_question_count(1), 5);
        assert_eq!(clamp_question_count(12), 12);
        assert_eq!(clamp_question_count(50), 20);
    }

    #[tokio::test]
    async fn test_generates_and_truncates_to_count() {
        let mock = MockProviders::start().await;
        mock.push_chat_json(question_json(7));

        let questions = generate_questions(
            &sample_listing(),
            Some(&sample_resume()),
            3,
            &mock.llm_client(),
        )
        .await
        .unwrap();
        // 3 is clamped up to 5
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].category, QuestionCategory::Technical);

        let prompt = mock.requests_to("/chat/completions")[0].json()["messages"][1]["content"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(prompt.contains("Generate 5 interview questions"));
        assert!(prompt.contains("Skills: Rust, PostgreSQL"));
    }

    #[tokio::test]
    async fn test_accepts_wrapped_array() {
        let mock = MockProviders::start().await;
        mock.push_chat_json(json!({"questions": question_json(5)}));

        let questions = generate_questions(&sample_listing(), None, 5, &mock.llm_client())
            .await
            .unwrap();
        assert_eq!(questions.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_array_is_an_error() {
        let mock = MockProviders::start().await;
        mock.push_chat_json(json!([]));

        let err = generate_questions(&sample_listing(), None, 10, &mock.llm_client())
            .await
            .unwrap_err();
        assert!(matches!(err, InterviewError::EmptyQuestions));
    }
}
