//! Messages that drive the layer manager.
use bevy::prelude::*;

use crate::dataset::Importance;

/// Flip one thematic layer, as the layer list buttons do.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ToggleLayer {
    pub code: String,
}

/// Switch all layers of a layer-list group on or off.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SetLayerGroup {
    pub group: String,
    pub active: bool,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetImportanceBaseline(pub Importance);
