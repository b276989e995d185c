//! JSON-schema function specs offered to the model for tool calling.

use serde_json::json;

use crate::llm_client::FunctionSpec;

pub const SEARCH_JOBS: &str = "search_jobs";
pub const ANALYZE_JOB_MATCH: &str = "analyze_job_match";
pub const ANALYZE_RESUME_QUALITY: &str = "analyze_resume_quality";
pub const GENERATE_INTERVIEW_QUESTIONS: &str = "generate_interview_questions";
pub const GENERATE_QUESTION_AUDIO: &str = "generate_question_audio";
pub const TRANSCRIBE_CANDIDATE_RESPONSE: &str = "transcribe_candidate_response";
pub const GENERATE_INTERVIEW_FEEDBACK: &str = "generate_interview_feedback";

const QUESTION_TYPES: [&str; 4] = ["Technical", "Behavioral", "Situational", "General"];

fn spec(name: &str, description: &str, parameters: serde_json::Value) -> FunctionSpec {
    FunctionSpec {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

pub fn search_jobs_tool() -> FunctionSpec {
    spec(
        SEARCH_JOBS,
        "Search for jobs using SERP API. Returns real job listings with titles, companies, descriptions, and application URLs.",
        json!({
            "type": "object",
            "properties": {
                "keywords": {"type": "string", "description": "Job title or keywords (e.g., 'Python Developer', 'Data Scientist')"},
                "location": {"type": "string", "description": "Job location (e.g., 'Remote', 'San Francisco, CA')"},
                "platform": {"type": "string", "enum": ["LinkedIn", "Indeed", "Glassdoor", "ZipRecruiter", "Monster"], "description": "Job platform to search"},
                "count": {"type": "integer", "minimum": 1, "maximum": 20, "default": 5, "description": "Number of jobs to return"}
            },
            "required": ["keywords", "location"]
        }),
    )
}

pub fn analyze_match_tool() -> FunctionSpec {
    spec(
        ANALYZE_JOB_MATCH,
        "Analyze how well a resume matches a job description. Returns match score, matching skills, gaps, and recommendations.",
        json!({
            "type": "object",
            "properties": {
                "resume_data": {"type": "object", "description": "Parsed resume with skills, experience, and education"},
                "job_data": {"type": "object", "description": "Job listing with title, company, description, and requirements"}
            },
            "required": ["resume_data", "job_data"]
        }),
    )
}

pub fn analyze_resume_tool() -> FunctionSpec {
    spec(
        ANALYZE_RESUME_QUALITY,
        "Review a parsed resume. Returns an overall assessment, strengths, weaknesses, content and format suggestions, and ATS tips.",
        json!({
            "type": "object",
            "properties": {
                "resume_data": {"type": "object", "description": "Parsed resume with skills, experience, and education"}
            },
            "required": ["resume_data"]
        }),
    )
}

pub fn generate_questions_tool() -> FunctionSpec {
    spec(
        GENERATE_INTERVIEW_QUESTIONS,
        "Generate interview questions based on job description and resume. Returns structured questions with context, tips, and suggested answers.",
        json!({
            "type": "object",
            "properties": {
                "job_data": {"type": "object", "description": "Job listing information"},
                "resume_data": {"type": "object", "description": "Parsed resume data (optional)"},
                "question_count": {"type": "integer", "minimum": 5, "maximum": 20, "default": 10, "description": "Number of questions to generate"}
            },
            "required": ["job_data"]
        }),
    )
}

pub fn generate_audio_tool() -> FunctionSpec {
    spec(
        GENERATE_QUESTION_AUDIO,
        "Generate text-to-speech audio for an interview question. Returns base64-encoded MP3 audio.",
        json!({
            "type": "object",
            "properties": {
                "question_text": {"type": "string", "description": "The interview question to convert to speech"},
                "question_type": {"type": "string", "enum": QUESTION_TYPES, "default": "General", "description": "Type of interview question"}
            },
            "required": ["question_text"]
        }),
    )
}

pub fn transcribe_audio_tool() -> FunctionSpec {
    spec(
        TRANSCRIBE_CANDIDATE_RESPONSE,
        "Transcribe candidate's audio response to text using Deepgram. Accepts base64 audio and returns transcribed text.",
        json!({
            "type": "object",
            "properties": {
                "audio_bytes": {"type": "string", "description": "Base64-encoded audio data in MP3/WAV format"},
                "mime_type": {"type": "string", "default": "audio/wav", "description": "MIME type of the audio"}
            },
            "required": ["audio_bytes"]
        }),
    )
}

pub fn generate_feedback_tool() -> FunctionSpec {
    spec(
        GENERATE_INTERVIEW_FEEDBACK,
        "Generate feedback for a candidate's interview response. Returns structured feedback with scores and suggestions.",
        json!({
            "type": "object",
            "properties": {
                "question": {"type": "string", "description": "The interview question that was asked"},
                "question_type": {"type": "string", "enum": QUESTION_TYPES, "description": "Type of interview question"},
                "candidate_response": {"type": "string", "description": "Candidate's transcribed response text"}
            },
            "required": ["question", "question_type", "candidate_response"]
        }),
    )
}

/// Every tool, in registry order.
pub fn tool_registry() -> Vec<FunctionSpec> {
    vec![
        search_jobs_tool(),
        analyze_match_tool(),
        analyze_resume_tool(),
        generate_questions_tool(),
        generate_audio_tool(),
        transcribe_audio_tool(),
        generate_feedback_tool(),
    ]
}
