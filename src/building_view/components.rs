use bevy::prelude::*;

use super::controller::BuildingViewStatus;

/// Requests from keyboard and UI to drive building view.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum BuildingViewRequest {
    Enter,
    Exit,
    StoreyUp,
    StoreyDown,
    SetStorey(String),
}

/// Written whenever the building, storey or status changes.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct BuildingViewChanged {
    pub status: BuildingViewStatus,
    pub building: Option<String>,
    pub storey: Option<String>,
    pub storeys: Vec<String>,
}
