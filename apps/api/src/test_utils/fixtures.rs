use crate::interview::{InterviewQuestion, QuestionCategory};
use crate::interview::models::Difficulty;
use crate::job_search::JobListing;
use crate::resume::models::{Proficiency, Skill};
use crate::resume::Resume;

pub fn sample_resume() -> Resume {
    Resume {
        name: "Priya Raman".to_string(),
        email: "priya@example.com".to_string(),
        phone: Some("+1 (555) 010-2030".to_string()),
        summary: "Backend engineer with seven years building payment systems.".to_string(),
        skills: vec![
            Skill {
                name: "Rust".to_string(),
                proficiency: Some(Proficiency::Expert),
                years_experience: Some(5),
            },
            Skill {
                name: "PostgreSQL".to_string(),
                proficiency: None,
                years_experience: None,
            },
        ],
        education: vec![],
        experience: vec![],
    }
}

pub fn sample_listing() -> JobListing {
    JobListing {
        title: "Senior Rust Engineer".to_string(),
        company: "Ferrous Labs".to_string(),
        description: "Build async payment services.\nRequirements:\n- Rust\n- PostgreSQL".to_string(),
        url: Some("https://jobs.example/1".to_string()),
        location: Some("Remote".to_string()),
        via: Some("LinkedIn".to_string()),
        posted_at: Some("2 days ago".to_string()),
        salary: None,
        schedule_type: Some("Full-time".to_string()),
    }
}

pub fn sample_questions(n: usize) -> Vec<InterviewQuestion> {
    (0..n)
        .map(|i| InterviewQuestion {
            question: format!("Walk me through design problem number {i}."),
            category: QuestionCategory::Technical,
            difficulty: Difficulty::Medium,
            context: None,
            suggested_answer: None,
            key_points: vec!["Trade-offs".to_string()],
            tips: Some("Think aloud".to_string()),
        })
        .collect()
}
