pub const QUESTION_GENERATION_SYSTEM: &str = "\
You are a hiring manager preparing a realistic interview. \
You MUST respond with a valid JSON array only, with no markdown fences and no commentary.";

/// Question generation prompt template.
/// Placeholders: {count}, {job_title}, {company}, {job_description}, {candidate}
pub const QUESTION_GENERATION_PROMPT: &str = r#"Generate {count} interview questions for the {job_title} role at {company}.

Job description:
{job_description}

Candidate background:
{candidate}

Mix Technical, Behavioral, Situational and General questions, weighted toward what the role needs.
Return a JSON array of exactly {count} objects:
[{"question": "", "category": "Technical|Behavioral|Situational|General", "difficulty": "Easy|Medium|Hard", "context": "why this is asked", "tips": "how to approach it", "suggested_answer": "", "key_points": [""]}]"#;

pub const FEEDBACK_SYSTEM: &str = "\
You are an interview coach giving honest, constructive feedback on a spoken answer. \
You MUST respond with valid JSON only, with no markdown fences and no commentary.";

/// Answer feedback prompt template.
/// Placeholders: {question_type}, {question}, {answer}
pub const FEEDBACK_PROMPT: &str = r#"Evaluate the candidate's answer to this {question_type} interview question.

Question: {question}

Transcribed answer:
{answer}

Score confidence (delivery, clarity, structure) and accuracy (correctness, relevance, depth) from 0 to 10.
Return a JSON object:
{"evaluation": "two to four sentences", "strengths": [""], "weaknesses": [""], "suggestions": [""], "confidence_score": number, "accuracy_score": number}"#;
