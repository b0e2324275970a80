//! Naming conventions shared by the dataset and the exported scene.

const LOD_MARKER: &str = "-lod_";
const OBJECT_KEY_SEGMENTS: usize = 3;

/// Name of the mesh node that renders `object_key` at `lod`.
pub fn mesh_name(object_key: &str, lod: u8) -> String {
    format!("{object_key}{LOD_MARKER}{lod}")
}

/// Removes a trailing `-lod_<n>` marker, if present.
pub fn strip_lod_suffix(name: &str) -> &str {
    match name.rfind(LOD_MARKER) {
        Some(index) => &name[..index],
        None => name,
    }
}

/// Object key formed by the leading `-`-separated segments of a node name.
///
/// Scene nodes may carry positional suffixes beyond the object key; the
/// object key itself always has three segments.
pub fn truncate_to_object_key(name: &str) -> Option<&str> {
    let mut end = 0;
    for (count, (index, _)) in name.match_indices('-').enumerate() {
        if count + 1 == OBJECT_KEY_SEGMENTS {
            end = index;
            break;
        }
    }
    (end > 0).then(|| &name[..end])
}

/// Appends `-<lod>` unless the name already names a level of detail.
pub fn with_lod(name: &str, lod: &str) -> String {
    if name.contains("lod_") {
        name.to_string()
    } else {
        format!("{name}-{lod}")
    }
}

/// Storey code encoded as the final segment of a storey's identifier.
pub fn storey_code_from_identifier(identifier: &str) -> &str {
    identifier
        .rsplit(['.', '-'])
        .next()
        .unwrap_or(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_names_carry_lod() {
        assert_eq!(mesh_name("Building-02", 2), "Building-02-lod_2");
        assert_eq!(strip_lod_suffix("Room-A-lod_0"), "Room-A");
        assert_eq!(strip_lod_suffix("Room-A"), "Room-A");
    }

    #[test]
    fn truncation_keeps_three_segments() {
        assert_eq!(
            truncate_to_object_key("NL-Building-0363-extra-1"),
            Some("NL-Building-0363")
        );
        assert_eq!(truncate_to_object_key("NL-Building-0363"), None);
        assert_eq!(truncate_to_object_key("plain"), None);
    }

    #[test]
    fn with_lod_respects_existing_suffix() {
        assert_eq!(with_lod("Building-02", "lod_2"), "Building-02-lod_2");
        assert_eq!(with_lod("Building-02-lod_0", "lod_2"), "Building-02-lod_0");
    }

    #[test]
    fn storey_codes_use_last_segment() {
        assert_eq!(storey_code_from_identifier("30.21.01"), "01");
        assert_eq!(storey_code_from_identifier("Building-02-Storey-00"), "00");
        assert_eq!(storey_code_from_identifier("00"), "00");
    }
}
