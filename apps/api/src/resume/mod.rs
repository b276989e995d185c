pub mod analysis;
pub mod extractor;
pub mod file_reader;
pub mod handlers;
pub mod models;
pub mod prompts;

pub use analysis::analyze_resume_quality;
pub use extractor::{extract_resume, missing_required_fields};
pub use file_reader::{read_resume_upload, ExtractError};
pub use models::{Resume, ResumeAnalysis, ResumeData};
