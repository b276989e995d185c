pub const MATCH_ANALYSIS_SYSTEM: &str = "\
You are an experienced technical recruiter who compares candidate profiles with job postings. \
You MUST respond with valid JSON only, with no markdown fences and no commentary.";

/// Resume/job match prompt template.
/// Placeholders: {skills}, {experience}, {job_title}, {company}, {job_description}
pub const MATCH_ANALYSIS_PROMPT: &str = r#"Analyze how well this candidate matches the job.

Candidate skills: {skills}
Candidate experience: {experience}

Job: {job_title} at {company}
Description:
{job_description}

Return a JSON object:
{"match_score": number from 0 to 100, "key_matches": ["..."], "gaps": ["..."], "recommendations": ["..."]}"#;
