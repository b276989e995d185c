pub mod handlers;
pub mod models;
pub mod serpapi;
pub mod storage;

pub use models::{JobListing, JobQuery, Platform, SavedJob};
pub use serpapi::{resume_keywords, JobSearchError, SerpApiClient};
