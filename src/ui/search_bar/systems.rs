// src/ui/search_bar/systems.rs
//
// Keyboard capture, suggestion list and picking from the search box.

use std::time::Duration;

use bevy::input::{keyboard::KeyboardInput, ButtonState};
use bevy::prelude::*;

use super::components::{
    SearchBox, SearchEdit, SearchQuery, SearchResultButton, SearchResults, SearchText,
};
use crate::{core::MapSettings, dataset::SearchIndex, picking::PickRequest};

// Visual constants
const PANEL_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.85);
const BOX_COLOR: Color = Color::srgb(0.18, 0.18, 0.18);
const BOX_FOCUSED_COLOR: Color = Color::srgb(0.28, 0.28, 0.28);
const TEXT_COLOR: Color = Color::WHITE;
const PLACEHOLDER_COLOR: Color = Color::srgb(0.6, 0.6, 0.6);
const RESULT_COLOR: Color = Color::srgb(0.22, 0.22, 0.22);
const RESULT_HOVER_COLOR: Color = Color::srgb(0.32, 0.32, 0.32);
const FONT_SIZE: f32 = 14.0;
const PLACEHOLDER: &str = "Search rooms and buildings ( / )";

pub fn spawn_search_bar(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Percent(35.0),
                width: Val::Percent(30.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                padding: UiRect::all(Val::Px(6.0)),
                ..default()
            },
            BackgroundColor(PANEL_COLOR),
        ))
        .with_children(|panel| {
            panel
                .spawn((
                    Button,
                    Node {
                        padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
                        ..default()
                    },
                    BackgroundColor(BOX_COLOR),
                    SearchBox,
                ))
                .with_children(|search_box| {
                    search_box.spawn((
                        Text::new(PLACEHOLDER),
                        font(),
                        TextColor(PLACEHOLDER_COLOR),
                        SearchText,
                    ));
                });
            panel.spawn((
                Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(2.0),
                    ..default()
                },
                SearchResults,
            ));
        });
}

fn font() -> TextFont {
    TextFont {
        font_size: FONT_SIZE,
        ..default()
    }
}

/// Click on the box or `/` focuses the search; a click elsewhere closes it.
pub fn focus_search_box(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    boxes: Query<&Interaction, With<SearchBox>>,
    results: Query<&Interaction, With<SearchResultButton>>,
    mut query: ResMut<SearchQuery>,
) {
    let clicked = mouse.just_pressed(MouseButton::Left);
    if query.is_focused() {
        let over_search = boxes
            .iter()
            .chain(results.iter())
            .any(|interaction| *interaction != Interaction::None);
        if clicked && !over_search {
            query.close();
        }
        return;
    }
    let box_clicked = clicked
        && boxes
            .iter()
            .any(|interaction| *interaction == Interaction::Pressed);
    if box_clicked || keys.just_pressed(KeyCode::Slash) {
        query.focus();
    }
}

/// Feeds key presses into a focused search box and keeps them from reaching
/// the map's keyboard shortcuts.
pub fn capture_search_input(
    mut inputs: MessageReader<KeyboardInput>,
    mut keys: ResMut<ButtonInput<KeyCode>>,
    mut query: ResMut<SearchQuery>,
    index: Res<SearchIndex>,
    settings: Res<MapSettings>,
    mut picks: MessageWriter<PickRequest>,
) {
    if !query.is_focused() {
        inputs.clear();
        return;
    }
    let delay = Duration::from_millis(settings.search_delay_ms);
    for input in inputs.read() {
        if input.state != ButtonState::Pressed {
            continue;
        }
        match query.apply_key(&input.logical_key, delay) {
            SearchEdit::Submitted => match query.submit(&index) {
                Some(key) => {
                    info!(target: "ui", "Search picked {}", key);
                    picks.write(PickRequest::Key(key));
                }
                None => debug!(target: "ui", "No search results for {:?}", query.text()),
            },
            SearchEdit::Edited | SearchEdit::Closed | SearchEdit::Ignored => {}
        }
    }
    keys.reset_all();
}

pub fn refresh_search_results(
    time: Res<Time>,
    index: Res<SearchIndex>,
    settings: Res<MapSettings>,
    mut query: ResMut<SearchQuery>,
) {
    let limit = settings.search_result_count;
    // Ticking alone must not count as a change, or the list is rebuilt every frame.
    if query
        .bypass_change_detection()
        .tick(time.delta(), &index, limit)
    {
        query.set_changed();
        debug!(
            target: "ui",
            "{} search results for {:?}",
            query.results().len(),
            query.text()
        );
    }
}

/// Mirrors the query into the box and rebuilds the suggestion buttons.
pub fn update_search_bar(
    mut commands: Commands,
    query: Res<SearchQuery>,
    mut texts: Query<(&mut Text, &mut TextColor), With<SearchText>>,
    mut boxes: Query<&mut BackgroundColor, With<SearchBox>>,
    lists: Query<(Entity, Option<&Children>), With<SearchResults>>,
) {
    if !query.is_changed() {
        return;
    }
    for (mut text, mut color) in &mut texts {
        let (line, tint) = if query.text().is_empty() && !query.is_focused() {
            (PLACEHOLDER.to_string(), PLACEHOLDER_COLOR)
        } else if query.is_focused() {
            (format!("{}_", query.text()), TEXT_COLOR)
        } else {
            (query.text().to_string(), TEXT_COLOR)
        };
        if text.0 != line {
            text.0 = line;
        }
        color.0 = tint;
    }
    for mut background in &mut boxes {
        background.0 = if query.is_focused() {
            BOX_FOCUSED_COLOR
        } else {
            BOX_COLOR
        };
    }

    for (list, children) in &lists {
        if let Some(children) = children {
            for child in children.to_vec() {
                commands.entity(child).despawn();
            }
        }
        if !query.is_focused() {
            continue;
        }
        commands.entity(list).with_children(|list| {
            if query.results().is_empty()
                && !query.is_searching()
                && !query.text().trim().is_empty()
            {
                list.spawn((Text::new("No results"), font(), TextColor(PLACEHOLDER_COLOR)));
                return;
            }
            for hit in query.results() {
                list.spawn((
                    Button,
                    Node {
                        padding: UiRect::axes(Val::Px(8.0), Val::Px(3.0)),
                        ..default()
                    },
                    BackgroundColor(RESULT_COLOR),
                    SearchResultButton {
                        key: hit.key.clone(),
                    },
                ))
                .with_children(|button| {
                    let label = if hit.matched == hit.key {
                        hit.key.clone()
                    } else {
                        format!("{} · {}", hit.matched, hit.key)
                    };
                    button.spawn((Text::new(label), font(), TextColor(TEXT_COLOR)));
                });
            }
        });
    }
}

pub fn handle_search_result_buttons(
    buttons: Query<(&Interaction, &SearchResultButton), Changed<Interaction>>,
    mut query: ResMut<SearchQuery>,
    mut picks: MessageWriter<PickRequest>,
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed {
            let key = query.choose(&button.key);
            info!(target: "ui", "Search picked {}", key);
            picks.write(PickRequest::Key(key));
            return;
        }
    }
}

pub fn search_result_hover(
    mut buttons: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<SearchResultButton>),
    >,
) {
    for (interaction, mut background) in &mut buttons {
        background.0 = match interaction {
            Interaction::Hovered | Interaction::Pressed => RESULT_HOVER_COLOR,
            Interaction::None => RESULT_COLOR,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::store::fixtures::campus;
    use bevy::input::keyboard::Key;

    fn press(app: &mut App, key_code: KeyCode, logical_key: Key) {
        let window = app.world_mut().spawn_empty().id();
        app.world_mut().write_message(KeyboardInput {
            key_code,
            logical_key,
            state: ButtonState::Pressed,
            text: None,
            repeat: false,
            window,
        });
    }

    fn search_app() -> App {
        let mut app = App::new();
        app.insert_resource(SearchIndex::build(&campus()))
            .insert_resource(MapSettings::default())
            .init_resource::<SearchQuery>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_message::<KeyboardInput>()
            .add_message::<PickRequest>()
            .add_systems(Update, capture_search_input);
        app
    }

    fn pick_requests(app: &App) -> Vec<PickRequest> {
        let messages = app.world().resource::<Messages<PickRequest>>();
        let mut cursor = messages.get_cursor();
        cursor.read(messages).cloned().collect()
    }

    #[test]
    fn enter_picks_the_best_match() {
        let mut app = search_app();
        app.world_mut().resource_mut::<SearchQuery>().focus();
        press(&mut app, KeyCode::Digit0, Key::Character("0".into()));
        press(&mut app, KeyCode::Digit3, Key::Character("3".into()));
        press(&mut app, KeyCode::Enter, Key::Enter);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyN);
        app.update();

        assert_eq!(
            pick_requests(&app),
            vec![PickRequest::Key("Building-03".into())]
        );
        assert!(!app.world().resource::<SearchQuery>().is_focused());
        // Shortcut keys are swallowed while typing.
        assert!(!app
            .world()
            .resource::<ButtonInput<KeyCode>>()
            .pressed(KeyCode::KeyN));
    }

    #[test]
    fn unfocused_box_ignores_typing() {
        let mut app = search_app();
        press(&mut app, KeyCode::KeyA, Key::Character("a".into()));
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyN);
        app.update();

        assert_eq!(app.world().resource::<SearchQuery>().text(), "");
        assert!(pick_requests(&app).is_empty());
        assert!(app
            .world()
            .resource::<ButtonInput<KeyCode>>()
            .pressed(KeyCode::KeyN));
    }
}
