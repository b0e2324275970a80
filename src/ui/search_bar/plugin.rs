// src/ui/search_bar/plugin.rs
//
// SearchBarPlugin: search box over buildings and rooms.

use bevy::input::InputSystems;
use bevy::prelude::*;

use super::{
    components::SearchQuery,
    systems::{
        capture_search_input, focus_search_box, handle_search_result_buttons,
        refresh_search_results, search_result_hover, spawn_search_bar, update_search_bar,
    },
};

pub struct SearchBarPlugin;

impl Plugin for SearchBarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SearchQuery>()
            .add_systems(Startup, spawn_search_bar)
            // Before Update so map shortcuts never see keys typed into the box.
            .add_systems(PreUpdate, capture_search_input.after(InputSystems))
            .add_systems(
                Update,
                (
                    focus_search_box,
                    handle_search_result_buttons,
                    search_result_hover,
                    refresh_search_results,
                    update_search_bar
                        .after(focus_search_box)
                        .after(handle_search_result_buttons)
                        .after(refresh_search_results),
                ),
            );
    }
}
