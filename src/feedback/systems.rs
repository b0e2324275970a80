use bevy::prelude::*;
use time::OffsetDateTime;

use super::{
    components::{FeedbackOutcome, SubmitFeedback},
    store::{FeedbackLog, FeedbackResponse},
};

pub fn handle_feedback_submissions(
    log: Res<FeedbackLog>,
    mut submissions: MessageReader<SubmitFeedback>,
    mut outcomes: MessageWriter<FeedbackOutcome>,
) {
    for submission in submissions.read() {
        let response = log.submit(
            &submission.body,
            submission.ip.clone(),
            OffsetDateTime::now_utc(),
        );
        match &response {
            FeedbackResponse::Ok => {
                info!(target: "feedback", "Stored feedback in {}", log.path().display())
            }
            FeedbackResponse::Rejected(errors) => {
                warn!(target: "feedback", "Rejected feedback: {}", errors.join("; "))
            }
            FeedbackResponse::Failed => {}
        }
        outcomes.write(FeedbackOutcome { response });
    }
}
