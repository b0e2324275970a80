use bevy::prelude::*;

use super::{
    components::{FeedbackOutcome, SubmitFeedback},
    store::FeedbackLog,
    systems::handle_feedback_submissions,
};
use crate::core::MapSettings;

pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        let path = app
            .world()
            .get_resource::<MapSettings>()
            .map(|settings| settings.feedback_log_path.clone())
            .unwrap_or_else(|| MapSettings::default().feedback_log_path);
        info!(target: "feedback", "Feedback log at {}", path);

        app.insert_resource(FeedbackLog::new(path))
            .add_message::<SubmitFeedback>()
            .add_message::<FeedbackOutcome>()
            .add_systems(Update, handle_feedback_submissions);
    }
}
