//! Details of the picked object for the info panel.
use bevy::prelude::*;
use serde_json::Value;

use crate::{
    core::MapError,
    dataset::{CityDataset, CityObjectKind},
};

#[derive(Debug, Clone, PartialEq)]
pub struct InfoContent {
    pub key: String,
    pub kind: CityObjectKind,
    pub title: String,
    /// Scalar attributes, sorted by name.
    pub attributes: Vec<(String, String)>,
    /// The object is a building that can be entered.
    pub building_view_hint: bool,
}

#[derive(Resource, Debug, Default, Clone)]
pub struct InfoPane {
    content: Option<InfoContent>,
}

impl InfoPane {
    pub fn show(&mut self, dataset: &CityDataset, key: &str) -> Result<(), MapError> {
        let object = dataset.require(key)?;
        let mut attributes: Vec<(String, String)> = object
            .attributes
            .iter()
            .filter_map(|(name, value)| scalar_text(value).map(|text| (name.clone(), text)))
            .collect();
        attributes.sort();

        let title = object
            .short_name()
            .or_else(|| object.space_id())
            .unwrap_or(&object.key)
            .to_string();
        self.content = Some(InfoContent {
            key: object.key.clone(),
            kind: object.kind.clone(),
            title,
            attributes,
            building_view_hint: object.kind == CityObjectKind::Building
                && dataset.has_floor_plan(&object.key),
        });
        Ok(())
    }

    pub fn hide(&mut self) {
        self.content = None;
    }

    pub fn content(&self) -> Option<&InfoContent> {
        self.content.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.content.is_some()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::store::fixtures::campus;

    #[test]
    fn shows_scalar_attributes_sorted() {
        let dataset = campus();
        let mut pane = InfoPane::default();

        pane.show(&dataset, "Building-02").unwrap();
        let content = pane.content().unwrap();
        assert_eq!(content.title, "Library");
        assert!(content.building_view_hint);
        let names: Vec<&str> = content.attributes.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Importance", "ShortName (EN)", "space_id"]);

        pane.hide();
        assert!(!pane.is_visible());
    }

    #[test]
    fn unknown_keys_leave_pane_unchanged() {
        let dataset = campus();
        let mut pane = InfoPane::default();
        pane.show(&dataset, "Room-A").unwrap();

        assert!(pane.show(&dataset, "Nope").is_err());
        assert_eq!(pane.content().unwrap().key, "Room-A");
        assert!(!pane.content().unwrap().building_view_hint);
    }
}
