//! City object records and typed accessors over their free-form attributes.
use std::fmt;

use bevy::math::Vec3;
use serde_json::{Map, Value};

/// Semantic type of a city object, parsed from its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CityObjectKind {
    Building,
    BuildingPart,
    BuildingStorey,
    BuildingRoom,
    BuildingUnit,
    GenericCityObject,
    CityObjectGroup,
    Other(String),
}

impl CityObjectKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Building" => Self::Building,
            "BuildingPart" => Self::BuildingPart,
            "BuildingStorey" => Self::BuildingStorey,
            "BuildingRoom" => Self::BuildingRoom,
            "BuildingUnit" => Self::BuildingUnit,
            "GenericCityObject" => Self::GenericCityObject,
            "CityObjectGroup" => Self::CityObjectGroup,
            other => Self::Other(other.to_string()),
        }
    }

    /// Level-of-detail suffix of the mesh that renders objects of this kind.
    pub fn mesh_lod(&self) -> u8 {
        match self {
            Self::Building => 2,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Building => "Building",
            Self::BuildingPart => "BuildingPart",
            Self::BuildingStorey => "BuildingStorey",
            Self::BuildingRoom => "BuildingRoom",
            Self::BuildingUnit => "BuildingUnit",
            Self::GenericCityObject => "GenericCityObject",
            Self::CityObjectGroup => "CityObjectGroup",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for CityObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal building significance, `Primary` being the most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Importance {
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
    Quinary,
}

impl Importance {
    pub const ALL: [Importance; 5] = [
        Importance::Primary,
        Importance::Secondary,
        Importance::Tertiary,
        Importance::Quaternary,
        Importance::Quinary,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(raw))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Secondary => "Secondary",
            Self::Tertiary => "Tertiary",
            Self::Quaternary => "Quaternary",
            Self::Quinary => "Quinary",
        }
    }

    /// True when this level is at or above `baseline` on the scale.
    pub fn meets(self, baseline: Importance) -> bool {
        self <= baseline
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const SHORT_NAME_ATTRIBUTES: [&str; 2] = ["ShortName (EN)", "Name - short (EN)"];

/// One entry of the `CityObjects` document.
#[derive(Debug, Clone)]
pub struct CityObject {
    pub key: String,
    pub kind: CityObjectKind,
    pub attributes: Map<String, Value>,
    pub parent: Option<String>,
    pub children: Vec<String>,
}

impl CityObject {
    pub fn new(key: impl Into<String>, kind: CityObjectKind) -> Self {
        Self {
            key: key.into(),
            kind,
            attributes: Map::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    pub fn space_id(&self) -> Option<&str> {
        self.attribute_str("space_id")
    }

    /// Layer code carried by unit containers.
    pub fn code(&self) -> Option<&str> {
        self.attribute_str("code")
    }

    pub fn importance(&self) -> Option<Importance> {
        self.attribute_str("Importance").and_then(Importance::parse)
    }

    pub fn short_name(&self) -> Option<&str> {
        SHORT_NAME_ATTRIBUTES
            .iter()
            .find_map(|name| self.attribute_str(name))
            .filter(|name| !name.trim().is_empty())
    }

    pub fn name_en(&self) -> Option<&str> {
        self.attribute_str("Name (EN)").filter(|name| !name.trim().is_empty())
    }

    pub fn name_nl(&self) -> Option<&str> {
        self.attribute_str("Name (NL)").filter(|name| !name.trim().is_empty())
    }

    /// Informal names, given as a list or a comma separated string.
    pub fn nicknames(&self) -> Vec<String> {
        self.string_list("Nicknames")
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Icon anchor converted from the Z-up dataset frame into the Y-up world frame.
    pub fn icon_position(&self) -> Option<Vec3> {
        let coords = self.attributes.get("icon_position")?.as_array()?;
        if coords.len() < 3 {
            return None;
        }
        let x = coords[0].as_f64()? as f32;
        let y = coords[1].as_f64()? as f32;
        let z = coords[2].as_f64()? as f32;
        Some(Vec3::new(x, z, -y))
    }

    pub fn unit_spaces(&self) -> Vec<String> {
        self.string_list("unit_spaces")
    }

    /// Full storey codes (`a.b.<storey>`) the unit occupies.
    pub fn unit_storeys(&self) -> Vec<String> {
        self.string_list("unit_storeys")
    }

    /// Whether the unit has any presence on `storey`.
    pub fn occupies_storey(&self, storey: &str) -> bool {
        self.unit_storeys()
            .iter()
            .any(|full| full.split('.').nth(2) == Some(storey))
    }

    fn string_list(&self, name: &str) -> Vec<String> {
        match self.attributes.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_attributes(value: Value) -> CityObject {
        let mut object = CityObject::new("Building-01", CityObjectKind::Building);
        if let Value::Object(map) = value {
            object.attributes = map;
        }
        object
    }

    #[test]
    fn unknown_types_are_kept_by_name() {
        assert_eq!(
            CityObjectKind::parse("Outdoor"),
            CityObjectKind::Other("Outdoor".into())
        );
        assert_eq!(CityObjectKind::parse("BuildingRoom").mesh_lod(), 0);
        assert_eq!(CityObjectKind::Building.mesh_lod(), 2);
    }

    #[test]
    fn importance_compares_against_baseline() {
        let baseline = Importance::Tertiary;
        assert!(Importance::Primary.meets(baseline));
        assert!(Importance::Tertiary.meets(baseline));
        assert!(!Importance::Quinary.meets(baseline));
        assert_eq!(Importance::parse(" secondary"), Some(Importance::Secondary));
        assert_eq!(Importance::parse("Sextary"), None);
    }

    #[test]
    fn icon_position_swaps_up_axis() {
        let object = with_attributes(json!({ "icon_position": [10.0, 20.0, 3.0] }));
        assert_eq!(object.icon_position(), Some(Vec3::new(10.0, 3.0, -20.0)));

        let broken = with_attributes(json!({ "icon_position": [1.0, 2.0] }));
        assert_eq!(broken.icon_position(), None);
    }

    #[test]
    fn unit_storeys_match_on_third_segment() {
        let object = with_attributes(json!({ "unit_storeys": ["30.01.00", "30.01.02"] }));
        assert!(object.occupies_storey("02"));
        assert!(!object.occupies_storey("01"));
    }

    #[test]
    fn short_name_accepts_both_spellings() {
        let object = with_attributes(json!({ "Name - short (EN)": "Aula" }));
        assert_eq!(object.short_name(), Some("Aula"));
        let empty = with_attributes(json!({ "ShortName (EN)": "  " }));
        assert_eq!(empty.short_name(), None);
    }
}
