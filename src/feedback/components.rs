//! Feedback messages.
use bevy::prelude::*;

use super::store::FeedbackResponse;

/// A raw JSON feedback body with the caller's address, if known.
#[derive(Message, Debug, Clone)]
pub struct SubmitFeedback {
    pub body: String,
    pub ip: Option<String>,
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct FeedbackOutcome {
    pub response: FeedbackResponse,
}
