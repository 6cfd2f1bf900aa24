//! Comparison difference records.
//!
//! A difference is plain data: where it happened, both values, and an
//! optional explanation. Values are serialized through their `Display`
//! rendering so that difference lists can be exported as JSON.

use crate::location::FieldLocation;
use crate::value::Value;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// One field-level mismatch between actual and expected
#[derive(Debug, Clone)]
pub struct ComparisonDifference {
    /// Where the mismatch was found
    pub location: FieldLocation,
    pub actual: Value,
    pub expected: Value,
    /// Engine explanation, e.g. why two collections could not be compared
    pub description: Option<String>,
    /// User message registered for the field or the type
    pub custom_message: Option<String>,
}

impl ComparisonDifference {
    pub fn new(location: FieldLocation, actual: Value, expected: Value) -> Self {
        Self {
            location,
            actual,
            expected,
            description: None,
            custom_message: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_custom_message(mut self, message: Option<String>) -> Self {
        self.custom_message = message;
        self
    }

    /// Report path, empty for the root
    pub fn path(&self) -> String {
        self.location.path()
    }

    /// Custom message if set, else the engine description
    pub fn explanation(&self) -> Option<&str> {
        self.custom_message
            .as_deref()
            .or(self.description.as_deref())
    }
}

impl fmt::Display for ComparisonDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.custom_message {
            return f.write_str(message);
        }
        let path = self.path();
        if path.is_empty() {
            write!(f, "Top level actual and expected objects differ:")?;
        } else {
            write!(f, "field/property '{}' differ:", path)?;
        }
        write!(
            f,
            "\n- actual value  : {}\n- expected value: {}",
            self.actual, self.expected
        )?;
        if let Some(description) = &self.description {
            write!(f, "\n{}", description)?;
        }
        Ok(())
    }
}

impl Serialize for ComparisonDifference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ComparisonDifference", 5)?;
        state.serialize_field("path", &self.path())?;
        state.serialize_field("actual", &self.actual.to_string())?;
        state.serialize_field("expected", &self.expected.to_string())?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("custom_message", &self.custom_message)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn difference() -> ComparisonDifference {
        ComparisonDifference::new(
            FieldLocation::parse("home.address.number"),
            Value::from(1),
            Value::from(2),
        )
    }

    #[test]
    fn test_display_names_path_and_both_values() {
        let rendered = difference().to_string();
        assert!(rendered.starts_with("field/property 'home.address.number' differ:"));
        assert!(rendered.contains("- actual value  : 1"));
        assert!(rendered.contains("- expected value: 2"));
    }

    #[test]
    fn test_display_root_difference() {
        let diff = ComparisonDifference::new(FieldLocation::root(), Value::from(1), Value::from(2));
        assert!(diff
            .to_string()
            .starts_with("Top level actual and expected objects differ:"));
    }

    #[test]
    fn test_custom_message_replaces_rendering() {
        let diff = difference().with_custom_message(Some("wrong number".to_string()));
        assert_eq!(diff.to_string(), "wrong number");
        assert_eq!(diff.explanation(), Some("wrong number"));
    }

    #[test]
    fn test_serializes_values_through_display() {
        let diff = difference().with_description("numbers differ");
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(
            json,
            json!({
                "path": "home.address.number",
                "actual": "1",
                "expected": "2",
                "description": "numbers differ",
                "custom_message": null,
            })
        );
    }
}
