//! Feedback storage: validation of submitted suggestions and the JSON-lines log.
pub mod components;
pub mod errors;
pub mod plugin;
pub mod store;
pub mod submission;
pub mod systems;

pub use components::{FeedbackOutcome, SubmitFeedback};
pub use errors::FeedbackError;
pub use plugin::FeedbackPlugin;
pub use store::{FeedbackLog, FeedbackResponse};
pub use submission::{FeedbackEntry, FeedbackSubmission};
