//! Error taxonomy for picking, camera and building-view operations.
use thiserror::Error;

/// Failures reported by the navigation core.
///
/// None of these are fatal: callers log them and abort only the action that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("unknown entity `{key}`")]
    UnknownEntity { key: String },
    #[error("no pick handler for `{key}` of type {kind}")]
    UnsupportedPickType { key: String, kind: String },
    #[error("unit `{key}` does not reference any spaces")]
    UnsupportedUnit { key: String },
    #[error("unit `{key}` spans several buildings: {buildings:?}")]
    CrossBuildingUnit { key: String, buildings: Vec<String> },
    #[error("storey `{code}` does not exist in building `{building}`")]
    InvalidStorey { building: String, code: String },
    #[error("nothing to animate towards: {context}")]
    AnimationTargetMissing { context: String },
    #[error("no building found above `{key}` within {depth} levels")]
    MalformedHierarchy { key: String, depth: usize },
    #[error("mesh `{mesh_key}` is not present in the scene")]
    MissingMesh { mesh_key: String },
    #[error("`{key}` has no usable `{attribute}` attribute")]
    MissingAttribute { key: String, attribute: String },
    #[error("building view cannot {action} while {status}")]
    InvalidState { action: String, status: String },
    #[error("the {mode} controls do not support zooming")]
    ZoomUnsupported { mode: String },
}

impl MapError {
    pub fn unknown_entity(key: impl Into<String>) -> Self {
        Self::UnknownEntity { key: key.into() }
    }

    pub fn animation_target_missing(context: impl Into<String>) -> Self {
        Self::AnimationTargetMissing {
            context: context.into(),
        }
    }

    pub fn missing_mesh(mesh_key: impl Into<String>) -> Self {
        Self::MissingMesh {
            mesh_key: mesh_key.into(),
        }
    }

    pub fn missing_attribute(key: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            key: key.into(),
            attribute: attribute.into(),
        }
    }

    pub fn invalid_state(action: impl Into<String>, status: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            action: action.into(),
            status: status.to_string(),
        }
    }

    /// Errors that only degrade the current action to a no-op.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AnimationTargetMissing { .. } | Self::InvalidStorey { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_key() {
        let err = MapError::CrossBuildingUnit {
            key: "Unit-1".into(),
            buildings: vec!["Building-01".into(), "Building-02".into()],
        };
        let text = err.to_string();
        assert!(text.contains("Unit-1"));
        assert!(text.contains("Building-02"));
    }

    #[test]
    fn only_missing_targets_and_storeys_are_recoverable() {
        assert!(MapError::animation_target_missing("empty mesh list").is_recoverable());
        assert!(MapError::InvalidStorey {
            building: "B".into(),
            code: "09".into()
        }
        .is_recoverable());
        assert!(!MapError::unknown_entity("nope").is_recoverable());
    }
}
