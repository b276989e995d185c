mod fixtures;
mod mock_providers;

pub use fixtures::{sample_listing, sample_questions, sample_resume};
pub use mock_providers::{chat_completion, MockProviders, MockReply, RecordedRequest};
