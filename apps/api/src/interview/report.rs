use chrono::{DateTime, Utc};

use crate::interview::models::InterviewSession;

fn score_or_na(score: Option<f64>) -> String {
    score
        .map(|s| format!("{s:.1}/10"))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Renders the downloadable markdown interview report.
pub fn render_report(session: &InterviewSession) -> String {
    let date = session
        .session_start_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Not started".to_string());

    let mut report = format!(
        "# Interview Report\n\n\
         **Position:** {}\n\
         **Company:** {}\n\
         **Interview Type:** {}\n\
         **Date:** {date}\n\n\
         ---\n\n\
         ## Overall Performance\n\n\
         - **Average Confidence Score:** {}\n\
         - **Average Accuracy Score:** {}\n\
         - **Questions Answered:** {}/{}\n\n\
         ---\n\n\
         ## Detailed Responses\n\n",
        session.job_title,
        session.company_name,
        session.interview_type,
        score_or_na(session.average_confidence()),
        score_or_na(session.average_accuracy()),
        session.responses.len(),
        session.questions.len(),
    );

    let mut responses: Vec<_> = session.responses.iter().collect();
    responses.sort_by_key(|r| r.question_id);

    for response in responses {
        let optional = |s: Option<f64>| s.map(|v| format!("{v}/10")).unwrap_or_else(|| "N/A".to_string());
        report.push_str(&format!(
            "### Question {}\n\n\
             **Question:** {}\n\n\
             **Your Response:**\n{}\n\n\
             **Time Taken:** {}\n\n\
             **Scores:**\n\
             - Confidence: {}\n\
             - Accuracy: {}\n\n\
             **AI Feedback:**\n{}\n\n\
             ---\n\n",
            response.question_id + 1,
            response.question_text,
            response.transcribed_text,
            response.time_taken_formatted(),
            optional(response.confidence_score),
            optional(response.accuracy_score),
            response.feedback.as_deref().unwrap_or("No feedback recorded"),
        ));
    }

    report
}

/// `interview_report_{title}_{YYYYmmdd_HHMMSS}.md`
pub fn report_file_name(session: &InterviewSession, at: DateTime<Utc>) -> String {
    format!(
        "interview_report_{}_{}.md",
        session.job_title.replace(' ', "_"),
        at.format("%Y%m%d_%H%M%S")
    )
}
