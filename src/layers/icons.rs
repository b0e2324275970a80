//! Icon sets: a world anchor with an optional text label and stacked layer icons.
use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::core::HexColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconContext {
    /// Label and icons above a building that is not being viewed inside.
    Building,
    Outdoor,
    /// Units on the active storey of the active building.
    Interior,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerIcon {
    pub path: String,
    pub color: HexColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconSet {
    /// Dataset object the set belongs to; clicking it picks this object.
    pub key: String,
    pub context: IconContext,
    pub label: Option<String>,
    pub position: Vec3,
    pub icons: BTreeMap<String, LayerIcon>,
}

impl IconSet {
    pub fn has_text(&self) -> bool {
        self.label.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IconRegistry {
    sets: BTreeMap<String, IconSet>,
}

impl IconRegistry {
    pub fn get(&self, key: &str) -> Option<&IconSet> {
        self.sets.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sets.contains_key(key)
    }

    pub fn sets(&self) -> impl Iterator<Item = &IconSet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn insert(&mut self, set: IconSet) {
        self.sets.insert(set.key.clone(), set);
    }

    /// Stack an icon onto an existing set. Returns false when there is no such set.
    pub fn add_icon(&mut self, key: &str, layer: &str, icon: LayerIcon) -> bool {
        match self.sets.get_mut(key) {
            Some(set) => {
                set.icons.insert(layer.to_string(), icon);
                true
            }
            None => false,
        }
    }

    pub fn remove_set(&mut self, key: &str) -> Option<IconSet> {
        self.sets.remove(key)
    }

    /// Drop `layer` from every set; sets left with neither icons nor label go away.
    pub fn remove_layer(&mut self, layer: &str) {
        self.sets.retain(|_, set| {
            if set.icons.remove(layer).is_none() {
                return true;
            }
            !set.icons.is_empty() || set.has_text()
        });
    }

    pub fn remove_where(&mut self, mut predicate: impl FnMut(&IconSet) -> bool) {
        self.sets.retain(|_, set| !predicate(set));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon() -> LayerIcon {
        LayerIcon {
            path: "icons/coffee.svg".into(),
            color: HexColor::new(0xf7c286),
        }
    }

    fn set(key: &str, label: Option<&str>, layers: &[&str]) -> IconSet {
        IconSet {
            key: key.into(),
            context: IconContext::Building,
            label: label.map(str::to_string),
            position: Vec3::ZERO,
            icons: layers.iter().map(|layer| (layer.to_string(), icon())).collect(),
        }
    }

    #[test]
    fn last_icon_removes_unlabelled_set() {
        let mut registry = IconRegistry::default();
        registry.insert(set("Unit-1", None, &["Fo-Co"]));
        registry.insert(set("Unit-2", None, &["Fo-Co", "Tr-Bi"]));
        registry.insert(set("Building-1", Some("01"), &["Fo-Co"]));

        registry.remove_layer("Fo-Co");
        assert!(!registry.contains("Unit-1"));
        assert_eq!(registry.get("Unit-2").map(|s| s.icons.len()), Some(1));
        let labelled = registry.get("Building-1").unwrap();
        assert!(labelled.icons.is_empty());
        assert_eq!(labelled.label.as_deref(), Some("01"));
    }

    #[test]
    fn icons_stack_on_existing_sets_only() {
        let mut registry = IconRegistry::default();
        assert!(!registry.add_icon("Building-1", "Fo-Co", icon()));
        registry.insert(set("Building-1", Some("01"), &[]));
        assert!(registry.add_icon("Building-1", "Fo-Co", icon()));
        assert_eq!(registry.get("Building-1").map(|s| s.icons.len()), Some(1));
    }
}
