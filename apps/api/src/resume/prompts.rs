// Prompts for resume extraction and quality analysis.

pub const RESUME_EXTRACTION_SYSTEM: &str = "\
You are an expert resume parser. You turn unstructured resume text into a single JSON object. \
You MUST respond with valid JSON only, with no markdown fences and no commentary.";

/// Resume extraction prompt template.
/// Placeholder: {resume_text}
pub const RESUME_EXTRACTION_PROMPT: &str = r#"Extract the candidate profile from the resume below.

Return a JSON object with exactly this shape:
{
  "name": "full name",
  "email": "email address",
  "phone": "phone number or null",
  "summary": "professional summary, 20 to 1000 characters",
  "skills": [
    {"name": "skill", "proficiency": "Beginner|Intermediate|Advanced|Expert or null", "years_experience": integer or null}
  ],
  "education": [
    {"degree": "", "institution": "", "start_date": "YYYY-MM-DD or null", "end_date": "YYYY-MM-DD or null", "gpa": number or null}
  ],
  "experience": [
    {"company": "", "position": "", "start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD or null if current", "description": "at least 10 characters", "achievements": [""]}
  ]
}

Rules:
- List at least one skill. Derive skills from experience if no skills section exists.
- If there is no explicit summary, write one from the experience section.
- Use null for unknown optional values. Never invent employers, dates or degrees.

Resume:
{resume_text}"#;

/// Appended on the second extraction attempt.
/// Placeholder: {violations}
pub const RESUME_EXTRACTION_RETRY_SUFFIX: &str = "\n\nYour previous answer failed validation:\n{violations}\nReturn a corrected JSON object.";

pub const RESUME_ANALYSIS_SYSTEM: &str = "\
You are a senior technical recruiter and resume coach. \
You MUST respond with valid JSON only, with no markdown fences and no commentary.";

/// Resume quality analysis prompt template.
/// Placeholder: {resume_json}
pub const RESUME_ANALYSIS_PROMPT: &str = r#"Review the resume below and assess its quality.

Return a JSON object:
{
  "overall_assessment": "two or three sentences",
  "strengths": ["at least three"],
  "weaknesses": ["at least three"],
  "content_improvements": ["specific rewrites or additions"],
  "format_suggestions": ["layout and structure advice"],
  "ats_optimization": ["keywords and formatting for applicant tracking systems"]
}

Resume:
{resume_json}"#;
