//! Data-only comparison settings loadable from JSON.
//!
//! Comparators, predicates and introspection strategies are code and cannot
//! be expressed here; everything else a configuration holds can.

use crate::errors::{DeepEqError, ExError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonSettings {
    pub strict_type_checking: bool,
    pub ignored_fields: Vec<String>,
    pub ignored_fields_matching_regexes: Vec<String>,
    pub ignored_types: Vec<String>,
    pub ignore_transient_members: bool,
    pub ignore_all_actual_null_fields: bool,
    pub ignore_all_expected_null_fields: bool,
    pub compared_fields: Vec<String>,
    pub skip_absent_members: bool,
    pub ignore_collection_order: bool,
    pub ignored_collection_order_in_fields: Vec<String>,
    pub ignored_collection_order_in_fields_matching_regexes: Vec<String>,
    pub treat_null_and_empty_collections_as_equal: bool,
    pub allow_comparing_enum_against_string: bool,
    /// Rules path -> custom error message
    pub field_messages: BTreeMap<String, String>,
    /// Type name -> custom error message
    pub type_messages: BTreeMap<String, String>,
}

impl ComparisonSettings {
    /// Parse settings from a JSON document
    ///
    /// # Errors
    ///
    /// - `InvalidSettings` - malformed JSON, wrong field types or unknown keys
    pub fn from_json_str(json: &str) -> Result<Self, ExError> {
        serde_json::from_str(json).map_err(|e| {
            ExError::from(DeepEqError::from(e)).with_op("load_comparison_settings")
        })
    }

    /// # Errors
    ///
    /// - `Serialization` - never expected for this plain data type
    pub fn to_json_string(&self) -> Result<String, ExError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ExError::from(DeepEqError::Serialization {
                message: e.to_string(),
            })
        })
    }
}
