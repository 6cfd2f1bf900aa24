//! Field locations inside compared graphs.
//!
//! A location is kept decomposed (`["group", "[0]", "name"]`). Two string
//! forms are derived from it:
//!
//! - the **report path** `group.[0].name`, shown in differences;
//! - the **rules path** `group.name`, with element segments removed, which is
//!   what ignore rules, overrides and custom messages are matched against.

use serde::{Deserialize, Serialize};

pub const FIELD_SEPARATOR: &str = ".";

/// Position of a node relative to the compared roots
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FieldLocation {
    segments: Vec<String>,
}

impl FieldLocation {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted path such as `neighbour.home.address`
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self {
            segments: path.split(FIELD_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// Location of a child member
    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Location of a sequence element
    pub fn element(&self, index: usize) -> Self {
        self.field(&format!("[{}]", index))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path shown in difference reports
    pub fn path(&self) -> String {
        self.segments.join(FIELD_SEPARATOR)
    }

    /// Path used to match configuration rules (element segments removed)
    pub fn rules_path(&self) -> String {
        self.segments
            .iter()
            .filter(|s| !is_element_segment(s))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    }

    /// Last segment, or the empty string for the root
    pub fn field_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The root, and elements of a top-level collection, are roots for rules
    pub fn is_root(&self) -> bool {
        self.segments.iter().all(|s| is_element_segment(s))
    }

    /// True when `parent`'s rules path is a strict prefix of this one
    pub fn has_parent(&self, parent: &FieldLocation) -> bool {
        let parent_path = parent.rules_path();
        let path = self.rules_path();
        if parent_path.is_empty() {
            return !path.is_empty();
        }
        path.starts_with(&format!("{}{}", parent_path, FIELD_SEPARATOR))
    }

    /// The rules path followed by every ancestor rules path, leaf to root
    pub fn hierarchy(&self) -> Vec<String> {
        let mut paths = Vec::new();
        let mut current = self.rules_path();
        while !current.is_empty() {
            paths.push(current.clone());
            current = match current.rfind(FIELD_SEPARATOR) {
                Some(idx) => current[..idx].to_string(),
                None => String::new(),
            };
        }
        paths
    }
}

impl std::fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.rules_path())
    }
}

fn is_element_segment(segment: &str) -> bool {
    segment.starts_with('[')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_and_rules_paths() {
        let location = FieldLocation::root().field("group").element(0).field("name");
        assert_eq!(location.path(), "group.[0].name");
        assert_eq!(location.rules_path(), "group.name");
        assert_eq!(location.field_name(), "name");
    }

    #[test]
    fn test_root_detection() {
        assert!(FieldLocation::root().is_root());
        assert!(FieldLocation::root().element(3).is_root());
        assert!(!FieldLocation::root().field("name").is_root());
    }

    #[test]
    fn test_has_parent_compares_whole_segments() {
        let name = FieldLocation::parse("name");
        let names_first = FieldLocation::parse("names.first");
        let name_first = FieldLocation::parse("name.first");

        assert!(name_first.has_parent(&name));
        assert!(!names_first.has_parent(&name));
        assert!(name.has_parent(&FieldLocation::root()));
    }

    #[test]
    fn test_hierarchy_is_leaf_to_root() {
        let location = FieldLocation::parse("a.b.c");
        assert_eq!(location.hierarchy(), vec!["a.b.c", "a.b", "a"]);
        assert!(FieldLocation::root().hierarchy().is_empty());
    }
}
