use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub proficiency: Option<Proficiency>,
    #[serde(default)]
    pub years_experience: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    #[serde(default, with = "flexible_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "flexible_date::option")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub gpa: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,
    /// `None` means the role is current.
    #[serde(default, with = "flexible_date::option")]
    pub end_date: Option<NaiveDate>,
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

/// Structured resume profile extracted from raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<WorkExperience>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("static phone regex"))
}

impl Resume {
    /// Returned when extraction fails outright.
    pub fn placeholder() -> Self {
        Self {
            name: "Unknown".to_string(),
            email: "unknown@email.com".to_string(),
            phone: None,
            summary: "Failed to parse resume".to_string(),
            skills: vec![],
            education: vec![],
            experience: vec![],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == "Unknown" && self.email == "unknown@email.com"
    }

    pub fn skill_names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Returns every violated rule. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let name_len = self.name.trim().chars().count();
        if !(1..=100).contains(&name_len) {
            violations.push("name must be 1-100 characters".to_string());
        }
        if !email_regex().is_match(self.email.trim()) {
            violations.push(format!("email '{}' is not a valid address", self.email));
        }
        if let Some(phone) = &self.phone {
            if !phone_regex().is_match(phone.trim()) {
                violations.push(format!(
                    "phone '{phone}' may only contain digits, spaces, '-', '(', ')' and a leading '+'"
                ));
            }
        }
        let summary_len = self.summary.trim().chars().count();
        if !(20..=1000).contains(&summary_len) {
            violations.push(format!(
                "summary must be 20-1000 characters (got {summary_len})"
            ));
        }
        if self.skills.is_empty() {
            violations.push("at least one skill is required".to_string());
        }

        for skill in &self.skills {
            let len = skill.name.trim().chars().count();
            if !(1..=100).contains(&len) {
                violations.push("skill names must be 1-100 characters".to_string());
            }
            if matches!(skill.years_experience, Some(years) if years > 50) {
                violations.push(format!(
                    "skill '{}' years_experience must be 0-50",
                    skill.name
                ));
            }
        }

        for edu in &self.education {
            if edu.degree.trim().is_empty() || edu.institution.trim().is_empty() {
                violations.push("education entries need a degree and an institution".to_string());
            }
            if matches!(edu.gpa, Some(gpa) if !(0.0..=10.0).contains(&gpa)) {
                violations.push(format!("GPA at {} must be 0.0-10.0", edu.institution));
            }
            if let (Some(start), Some(end)) = (edu.start_date, edu.end_date) {
                if end < start {
                    violations.push(format!(
                        "education at {}: end_date must be after start_date",
                        edu.institution
                    ));
                }
            }
        }

        for job in &self.experience {
            if job.company.trim().is_empty() || job.position.trim().is_empty() {
                violations.push("experience entries need a company and a position".to_string());
            }
            if job.description.trim().chars().count() < 10 {
                violations.push(format!(
                    "experience at {}: description must be at least 10 characters",
                    job.company
                ));
            }
        }

        violations
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quality analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub overall_assessment: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub content_improvements: Vec<String>,
    #[serde(default)]
    pub format_suggestions: Vec<String>,
    #[serde(default)]
    pub ats_optimization: Vec<String>,
}

impl ResumeAnalysis {
    /// Stand-in used when the quality analysis call fails.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            overall_assessment: format!("Analysis unavailable: {reason}"),
            strengths: vec!["Resume parsed successfully".to_string()],
            weaknesses: vec!["Could not generate detailed analysis".to_string()],
            content_improvements: vec![],
            format_suggestions: vec![],
            ats_optimization: vec![],
        }
    }
}

/// The workflow's resume slot: raw text always, profile and analysis once computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    pub raw_text: String,
    #[serde(default)]
    pub profile: Option<Resume>,
    #[serde(default)]
    pub analysis: Option<ResumeAnalysis>,
}

impl ResumeData {
    pub fn from_text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            profile: None,
            analysis: None,
        }
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM` and `YYYY`. "Present"/"Current" and empty strings read as absent.
mod flexible_date {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
            return Some(date);
        }
        raw.parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
    }

    fn is_open_ended(raw: &str) -> bool {
        let raw = raw.trim().to_lowercase();
        raw.is_empty() || raw == "present" || raw == "current" || raw == "now"
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognised date '{raw}'")))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
            let raw = Option::<String>::deserialize(d)?;
            match raw {
                None => Ok(None),
                Some(raw) if is_open_ended(&raw) => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("unrecognised date '{raw}'"))),
            }
        }
    }
}
