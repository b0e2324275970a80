use bevy::prelude::*;

/// Navigation requests from keyboard shortcuts and UI buttons.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum PickRequest {
    /// Pick an object by key or scene node name.
    Key(String),
    Clear,
    ToggleProjection,
}

/// Written after every pick attempt: the picked key, or `None` when cleared or failed.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct PickChanged {
    pub key: Option<String>,
}
