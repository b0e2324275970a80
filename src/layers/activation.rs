//! Active-layer bookkeeping: an explicit set and its closure under `Implies`.
use std::collections::{BTreeSet, VecDeque};

use crate::core::MapError;

use super::definitions::LayerCatalog;

/// Layers whose active state flipped in one toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerChange {
    pub activated: Vec<String>,
    pub deactivated: Vec<String>,
}

impl LayerChange {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerActivation {
    explicit: BTreeSet<String>,
    active: BTreeSet<String>,
}

impl LayerActivation {
    pub fn is_active(&self, code: &str) -> bool {
        self.active.contains(code)
    }

    pub fn is_explicit(&self, code: &str) -> bool {
        self.explicit.contains(code)
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    /// Flip one layer and recompute the closure. Switching off a layer that is
    /// only on through `Implies` also withdraws the toggled layers implying it,
    /// so the active set stays closed.
    pub fn toggle(&mut self, catalog: &LayerCatalog, code: &str) -> Result<LayerChange, MapError> {
        if !catalog.contains(code) {
            return Err(MapError::unknown_entity(code));
        }
        if self.explicit.contains(code) {
            self.explicit.remove(code);
        } else if self.active.contains(code) {
            let implying: Vec<String> = self
                .explicit
                .iter()
                .filter(|root| closure(catalog, &BTreeSet::from([(*root).clone()])).contains(code))
                .cloned()
                .collect();
            for root in &implying {
                self.explicit.remove(root);
            }
        } else {
            self.explicit.insert(code.to_string());
        }

        let next = closure(catalog, &self.explicit);
        let change = LayerChange {
            activated: next.difference(&self.active).cloned().collect(),
            deactivated: self.active.difference(&next).cloned().collect(),
        };
        self.active = next;
        Ok(change)
    }
}

/// Least set containing `roots` and closed under `Implies`.
fn closure(catalog: &LayerCatalog, roots: &BTreeSet<String>) -> BTreeSet<String> {
    let mut active: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<&str> = roots.iter().map(String::as_str).collect();
    while let Some(code) = queue.pop_front() {
        if !active.insert(code.to_string()) {
            continue;
        }
        for implied in catalog.implications(code) {
            if !active.contains(implied) {
                queue.push_back(implied);
            }
        }
    }
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::definitions::fixtures::catalog;

    #[test]
    fn activation_pulls_in_implied_layers() {
        let catalog = catalog();
        let mut activation = LayerActivation::default();
        let change = activation.toggle(&catalog, "Fo-Al").unwrap();
        assert_eq!(change.activated, vec!["Fo-Al".to_string(), "Fo-Co".to_string()]);
        assert!(activation.is_active("Fo-Co"));
        assert!(!activation.is_explicit("Fo-Co"));
    }

    #[test]
    fn double_toggle_restores_implied_state() {
        let catalog = catalog();
        let mut activation = LayerActivation::default();
        activation.toggle(&catalog, "Tr-Al").unwrap();
        assert!(activation.is_active("Tr-Bi"));
        activation.toggle(&catalog, "Tr-Al").unwrap();
        assert!(!activation.is_active("Tr-Bi"));
        assert_eq!(activation.active().count(), 0);
    }

    #[test]
    fn explicitly_active_layers_survive_their_implier() {
        let catalog = catalog();
        let mut activation = LayerActivation::default();
        activation.toggle(&catalog, "Fo-Co").unwrap();
        activation.toggle(&catalog, "Fo-Al").unwrap();
        let change = activation.toggle(&catalog, "Fo-Al").unwrap();
        assert_eq!(change.deactivated, vec!["Fo-Al".to_string()]);
        assert!(activation.is_active("Fo-Co"));
    }

    #[test]
    fn switching_off_an_implied_layer_withdraws_its_implier() {
        let catalog = catalog();
        let mut activation = LayerActivation::default();
        activation.toggle(&catalog, "Fo-Al").unwrap();
        activation.toggle(&catalog, "Tr-Al").unwrap();

        let change = activation.toggle(&catalog, "Fo-Co").unwrap();
        assert_eq!(
            change.deactivated,
            vec!["Fo-Al".to_string(), "Fo-Co".to_string()]
        );
        assert!(change.activated.is_empty());
        assert!(!activation.is_active("Fo-Co"));
        assert!(!activation.is_explicit("Fo-Al"));
        // Unrelated layers stay on.
        assert!(activation.is_active("Tr-Al"));
        assert!(activation.is_active("Tr-Bi"));

        // Toggling it again turns on only the layer itself.
        let change = activation.toggle(&catalog, "Fo-Co").unwrap();
        assert_eq!(change.activated, vec!["Fo-Co".to_string()]);
        assert!(activation.is_explicit("Fo-Co"));
        assert!(!activation.is_active("Fo-Al"));
    }

    #[test]
    fn switching_off_an_explicit_layer_keeps_its_implier() {
        let catalog = catalog();
        let mut activation = LayerActivation::default();
        activation.toggle(&catalog, "Fo-Co").unwrap();
        activation.toggle(&catalog, "Fo-Al").unwrap();

        // Fo-Co was toggled on by itself; switching it off leaves it implied by Fo-Al.
        let change = activation.toggle(&catalog, "Fo-Co").unwrap();
        assert!(change.is_empty());
        assert!(activation.is_active("Fo-Co"));
        assert!(!activation.is_explicit("Fo-Co"));
        assert!(activation.is_explicit("Fo-Al"));
    }

    #[test]
    fn unknown_layers_are_reported() {
        let catalog = catalog();
        let mut activation = LayerActivation::default();
        assert!(matches!(
            activation.toggle(&catalog, "Xx-Hidden"),
            Err(MapError::UnknownEntity { .. })
        ));
    }
}
