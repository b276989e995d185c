use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interview::InterviewError;

pub const DEFAULT_INTERVIEW_TYPE: &str = "Technical Interview";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionCategory {
    #[serde(alias = "technical")]
    Technical,
    #[serde(alias = "behavioral", alias = "Behavioural", alias = "behavioural")]
    Behavioral,
    #[serde(alias = "situational")]
    Situational,
    #[default]
    #[serde(alias = "general")]
    General,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Technical => "Technical",
            QuestionCategory::Behavioral => "Behavioral",
            QuestionCategory::Situational => "Situational",
            QuestionCategory::General => "General",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(default)]
    pub category: QuestionCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub suggested_answer: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub tips: Option<String>,
}

impl InterviewQuestion {
    /// Explicit tips when given, otherwise the key points as bullets.
    pub fn tips_text(&self) -> String {
        match self.tips.as_deref().map(str::trim) {
            Some(tips) if !tips.is_empty() => tips.to_string(),
            _ => self
                .key_points
                .iter()
                .map(|p| format!("• {p}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub evaluation: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub confidence_score: f64,
    pub accuracy_score: f64,
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 10.0)
    } else {
        0.0
    }
}

impl InterviewFeedback {
    pub fn clamped(mut self) -> Self {
        self.confidence_score = clamp_score(self.confidence_score);
        self.accuracy_score = clamp_score(self.accuracy_score);
        self
    }

    /// Markdown block shown under each answer.
    pub fn to_formatted_string(&self) -> String {
        let mut out = format!("**Evaluation:**\n{}\n\n", self.evaluation);

        let sections = [
            ("Strengths", &self.strengths),
            ("Weaknesses", &self.weaknesses),
            ("Suggestions for Improvement", &self.suggestions),
        ];
        for (heading, items) in sections {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("**{heading}:**\n"));
            for item in items {
                out.push_str(&format!("- {item}\n"));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "**Confidence Score:** {}/10\n",
            self.confidence_score
        ));
        out.push_str(&format!("**Accuracy Score:** {}/10", self.accuracy_score));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question_id: usize,
    pub question_text: String,
    /// Artifact-store key of the recorded answer, when uploaded.
    #[serde(default)]
    pub audio_response_key: Option<String>,
    #[serde(default)]
    pub transcribed_text: String,
    #[serde(default)]
    pub time_taken_seconds: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub accuracy_score: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl QuestionResponse {
    /// `H:MM:SS`, or "Not recorded".
    pub fn time_taken_formatted(&self) -> String {
        match self.time_taken_seconds {
            Some(secs) if secs.is_finite() && secs >= 0.0 => {
                let total = secs as u64;
                format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
            }
            _ => "Not recorded".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub job_title: String,
    pub company_name: String,
    pub interview_type: String,
    pub questions: Vec<InterviewQuestion>,
    #[serde(default)]
    pub responses: Vec<QuestionResponse>,
    #[serde(default)]
    pub current_question_index: usize,
    /// When the current question was presented; used for time taken.
    #[serde(default)]
    pub question_asked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub session_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub session_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
}

impl InterviewSession {
    /// Starts an active session at question 0.
    pub fn start(
        job_title: impl Into<String>,
        company_name: impl Into<String>,
        interview_type: impl Into<String>,
        questions: Vec<InterviewQuestion>,
    ) -> Result<Self, InterviewError> {
        if questions.is_empty() {
            return Err(InterviewError::NoQuestions);
        }
        let now = Utc::now();
        Ok(Self {
            job_title: job_title.into(),
            company_name: company_name.into(),
            interview_type: interview_type.into(),
            questions,
            responses: vec![],
            current_question_index: 0,
            question_asked_at: Some(now),
            session_start_time: Some(now),
            session_end_time: None,
            is_active: true,
        })
    }

    pub fn current_question(&self) -> Option<&InterviewQuestion> {
        self.questions.get(self.current_question_index)
    }

    pub fn response_for(&self, question_id: usize) -> Option<&QuestionResponse> {
        self.responses.iter().find(|r| r.question_id == question_id)
    }

    /// Stores an answer. Answering a question again replaces the earlier answer.
    pub fn record_response(&mut self, response: QuestionResponse) {
        match self
            .responses
            .iter_mut()
            .find(|r| r.question_id == response.question_id)
        {
            Some(existing) => *existing = response,
            None => self.responses.push(response),
        }
    }

    /// Jumps to a question and restarts its timer.
    pub fn navigate_to(&mut self, index: usize) -> Result<(), InterviewError> {
        if index >= self.questions.len() {
            return Err(InterviewError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.current_question_index = index;
        self.question_asked_at = Some(Utc::now());
        Ok(())
    }

    pub fn finish(&mut self) {
        self.is_active = false;
        self.session_end_time = Some(Utc::now());
    }

    pub fn progress_percentage(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.responses.len() as f64 / self.questions.len() as f64 * 100.0
    }

    pub fn average_confidence(&self) -> Option<f64> {
        average(self.responses.iter().filter_map(|r| r.confidence_score))
    }

    pub fn average_accuracy(&self) -> Option<f64> {
        average(self.responses.iter().filter_map(|r| r.accuracy_score))
    }
}

fn average(scores: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = scores.fold((0.0, 0usize), |(sum, n), s| (sum + s, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_questions;
    use serde_json::json;

    fn response(question_id: usize, confidence: Option<f64>) -> QuestionResponse {
        QuestionResponse {
            question_id,
            question_text: format!("Q{question_id}"),
            audio_response_key: None,
            transcribed_text: "answer".to_string(),
            time_taken_seconds: None,
            feedback: None,
            confidence_score: confidence,
            accuracy_score: confidence,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_session_requires_questions() {
        let err = InterviewSession::start("SRE", "Acme", DEFAULT_INTERVIEW_TYPE, vec![]).unwrap_err();
        assert!(matches!(err, InterviewError::NoQuestions));
    }

    #[test]
    fn test_progress_and_averages() {
        let mut session =
            InterviewSession::start("SRE", "Acme", DEFAULT_INTERVIEW_TYPE, sample_questions(4))
                .unwrap();
        assert_eq!(session.progress_percentage(), 0.0);
        assert_eq!(session.average_confidence(), None);

        session.record_response(response(0, Some(8.0)));
        session.record_response(response(1, Some(0.0)));
        session.record_response(response(2, None));
        assert_eq!(session.progress_percentage(), 75.0);
        // A zero score still counts; only missing scores are skipped.
        assert_eq!(session.average_confidence(), Some(4.0));
    }

    #[test]
    fn test_re_answer_replaces_previous_response() {
        let mut session =
            InterviewSession::start("SRE", "Acme", DEFAULT_INTERVIEW_TYPE, sample_questions(2))
                .unwrap();
        session.record_response(response(0, Some(3.0)));
        session.record_response(response(0, Some(9.0)));
        assert_eq!(session.responses.len(), 1);
        assert_eq!(session.average_accuracy(), Some(9.0));
        assert!(session.response_for(1).is_none());
    }

    #[test]
    fn test_navigate_to_bounds() {
        let mut session =
            InterviewSession::start("SRE", "Acme", DEFAULT_INTERVIEW_TYPE, sample_questions(3))
                .unwrap();
        session.navigate_to(2).unwrap();
        assert_eq!(session.current_question_index, 2);

        let err = session.navigate_to(3).unwrap_err();
        assert!(matches!(err, InterviewError::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(session.current_question_index, 2);
    }

    #[test]
    fn test_time_taken_formatted() {
        let mut r = response(0, None);
        assert_eq!(r.time_taken_formatted(), "Not recorded");
        r.time_taken_seconds = Some(65.9);
        assert_eq!(r.time_taken_formatted(), "0:01:05");
        r.time_taken_seconds = Some(3725.0);
        assert_eq!(r.time_taken_formatted(), "1:02:05");
    }

    #[test]
    fn test_tips_text_falls_back_to_key_points() {
        let mut q = sample_questions(1).remove(0);
        q.tips = None;
        q.key_points = vec!["Mention trade-offs".to_string(), "Give numbers".to_string()];
        assert_eq!(q.tips_text(), "• Mention trade-offs\n• Give numbers");

        q.tips = Some("Use STAR".to_string());
        assert_eq!(q.tips_text(), "Use STAR");
    }

    #[test]
    fn test_question_category_accepts_lowercase() {
        let q: InterviewQuestion = serde_json::from_value(json!({
            "question": "Describe a conflict with a teammate.",
            "category": "behavioral",
            "difficulty": "hard"
        }))
        .unwrap();
        assert_eq!(q.category, QuestionCategory::Behavioral);
        assert_eq!(q.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_feedback_formatting_and_clamping() {
        let feedback = InterviewFeedback {
            evaluation: "Clear and structured answer.".to_string(),
            strengths: vec!["Concrete example".to_string()],
            weaknesses: vec![],
            suggestions: vec!["Quantify impact".to_string()],
            confidence_score: 12.0,
            accuracy_score: 7.5,
        }
        .clamped();
        assert_eq!(feedback.confidence_score, 10.0);

        let text = feedback.to_formatted_string();
        assert!(text.starts_with("**Evaluation:**\nClear and structured answer.\n\n"));
        assert!(text.contains("**Strengths:**\n- Concrete example\n\n"));
        assert!(!text.contains("**Weaknesses:**"));
        assert!(text.contains("**Suggestions for Improvement:**\n- Quantify impact\n\n"));
        assert!(text.ends_with("**Confidence Score:** 10/10\n**Accuracy Score:** 7.5/10"));
    }
}
