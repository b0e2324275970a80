//! HighlightPlugin owns the pick highlighter and the outline set.
use bevy::prelude::*;

use super::{
    highlighter::Highlighter,
    outline::OutlineManager,
    systems::{apply_default_outline, apply_outline_line_width, draw_outlines, resize_outlines},
};
use crate::core::MapSettings;

pub struct HighlightPlugin;

impl Plugin for HighlightPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<MapSettings>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(Highlighter::new(settings.pick_color))
            .insert_resource(OutlineManager::new(&settings))
            .add_systems(
                Update,
                (
                    apply_default_outline,
                    resize_outlines,
                    apply_outline_line_width.after(resize_outlines),
                    draw_outlines,
                ),
            );
    }
}
