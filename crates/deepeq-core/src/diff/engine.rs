//! Recursive comparison engine.
//!
//! The core entry point is [`compare`], which walks two value graphs depth
//! first and returns every field-level [`ComparisonDifference`] in traversal
//! order.

#![allow(clippy::result_large_err)]

use crate::config::ComparisonConfiguration;
use crate::diff::model::ComparisonDifference;
use crate::errors::{DeepEqError, ExError};
use crate::location::FieldLocation;
use crate::value::{to_value, MapRef, ObjectKind, ObjectRef, Seq, Value};
use crate::{log_op_end, log_op_error, log_op_start};
use deepeq_core_types::ComparisonId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

const STRICT_TYPE_ERROR: &str = "the compared values are considered different since the recursive comparison enforces strict type checking and the actual value type";

/// Per-call traversal state.
///
/// `ancestors` holds the `(actual, expected)` identity pairs of the
/// containers and objects currently being descended into. A pair is popped
/// once its subtree is done, so only a true back reference is treated as a
/// cycle; the same pair reached twice through sibling paths is compared twice.
struct ComparisonState<'c> {
    config: &'c ComparisonConfiguration,
    ancestors: Vec<(usize, usize)>,
}

impl<'c> ComparisonState<'c> {
    fn new(config: &'c ComparisonConfiguration) -> Self {
        Self {
            config,
            ancestors: Vec::new(),
        }
    }

    fn run(&mut self, actual: &Value, expected: &Value) -> Result<Vec<ComparisonDifference>, ExError> {
        self.check_compared_fields_exist(actual)?;
        // a root compared with itself is equal whatever the overrides say, scalars included
        if std::ptr::eq(actual, expected) {
            return Ok(Vec::new());
        }

        let root = FieldLocation::root();
        if self.config.is_in_strict_type_checking_mode() && types_differ(actual, expected) {
            let mut differences = Vec::with_capacity(1);
            self.report(
                &mut differences,
                &root,
                actual,
                expected,
                Some(strict_type_message(actual, expected)),
            );
            return Ok(differences);
        }

        let mut differences = Vec::new();
        self.compare_node(&root, actual, expected, &mut differences)?;
        Ok(differences)
    }

    /// Every compare-only path must name members that exist on the root actual value
    fn check_compared_fields_exist(&self, actual: &Value) -> Result<(), ExError> {
        let strategy = self.config.introspection();
        for compared in self.config.compared_fields() {
            let mut current = actual.clone();
            for segment in compared.segments() {
                let next = match current.as_object() {
                    Some(object_ref) => {
                        let object = object_ref.borrow();
                        if !strategy.member_names(&object).contains(segment) {
                            return Err(ExError::from(DeepEqError::UnknownComparedField {
                                field: compared.rules_path(),
                                member: segment.clone(),
                                type_name: object.type_name().to_string(),
                            })
                            .with_op("compare"));
                        }
                        strategy
                            .read_member(&object, segment)
                            .map_err(|e| e.with_path(compared.path()).with_op("compare"))?
                    }
                    // collections and scalars cannot be checked statically
                    None => break,
                };
                current = next;
            }
        }
        Ok(())
    }

    /// Compare one node, appending its differences (and its descendants') to `out`
    fn compare_node(
        &mut self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        out: &mut Vec<ComparisonDifference>,
    ) -> Result<(), ExError> {
        let config = self.config;

        // ignored beats every override registered for the same node
        if config.should_ignore(location, actual, expected) || !config.is_compared(location) {
            tracing::trace!(path = %location.path(), "node ignored");
            return Ok(());
        }

        if actual.is_null() && expected.is_null() {
            return Ok(());
        }
        let pair = match (actual.identity(), expected.identity()) {
            (Some(a), Some(e)) if a == e => return Ok(()),
            (Some(a), Some(e)) => Some((a, e)),
            _ => None,
        };
        if let Some(pair) = pair {
            if self.ancestors.contains(&pair) {
                tracing::trace!(path = %location.path(), "cycle detected, node considered equal");
                return Ok(());
            }
        }

        if let Some((comparison_override, source)) = config.override_for(location, actual, expected) {
            let equal = comparison_override.are_equal(actual, expected);
            tracing::trace!(
                path = %location.path(),
                source = %source,
                equal,
                "override decided node"
            );
            if !equal {
                self.report(out, location, actual, expected, None);
            }
            return Ok(());
        }

        if actual.is_null() || expected.is_null() {
            let other = if actual.is_null() { expected } else { actual };
            if config.treats_null_and_empty_collections_as_equal() && other.is_empty_container() {
                return Ok(());
            }
            self.report(out, location, actual, expected, None);
            return Ok(());
        }

        if actual.is_enum() || expected.is_enum() {
            self.compare_as_enums(location, actual, expected, out);
            return Ok(());
        }

        if let Some(pair) = pair {
            self.ancestors.push(pair);
        }
        let result = self.compare_structure(location, actual, expected, out);
        if pair.is_some() {
            self.ancestors.pop();
        }
        result
    }

    fn compare_structure(
        &mut self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        out: &mut Vec<ComparisonDifference>,
    ) -> Result<(), ExError> {
        let ignore_order = self.config.should_ignore_collection_order(location);
        if matches!(actual, Value::Array(_)) && matches!(expected, Value::List(_) | Value::Set(_)) {
            let description = format!(
                "actual field is an array but expected field is not ({})",
                expected.type_name()
            );
            self.report(out, location, actual, expected, Some(description));
            return Ok(());
        }
        match expected {
            Value::Array(expected_seq) => {
                let Value::Array(actual_seq) = actual else {
                    let description = different_type_message("an array", actual);
                    self.report(out, location, actual, expected, Some(description));
                    return Ok(());
                };
                if !self.same_size("arrays", location, actual, expected, actual_seq.len(), expected_seq.len(), out) {
                    return Ok(());
                }
                if ignore_order {
                    self.compare_unordered(location, actual, expected, actual_seq, expected_seq, out)
                } else {
                    self.compare_ordered(location, actual_seq, expected_seq, out)
                }
            }
            Value::List(expected_seq) if !ignore_order => {
                let Value::List(actual_seq) = actual else {
                    let description = format!(
                        "expected field is an ordered collection but actual field is not ({})",
                        actual.type_name()
                    );
                    self.report(out, location, actual, expected, Some(description));
                    return Ok(());
                };
                if !self.same_size("collections", location, actual, expected, actual_seq.len(), expected_seq.len(), out) {
                    return Ok(());
                }
                self.compare_ordered(location, actual_seq, expected_seq, out)
            }
            Value::List(expected_seq) | Value::Set(expected_seq) => {
                let actual_seq = match actual {
                    Value::List(s) | Value::Set(s) => s,
                    _ => {
                        let description = different_type_message("an iterable", actual);
                        self.report(out, location, actual, expected, Some(description));
                        return Ok(());
                    }
                };
                if !self.same_size("collections", location, actual, expected, actual_seq.len(), expected_seq.len(), out) {
                    return Ok(());
                }
                self.compare_unordered(location, actual, expected, actual_seq, expected_seq, out)
            }
            Value::Map(expected_map) => {
                let Value::Map(actual_map) = actual else {
                    let description = different_type_message("a map", actual);
                    self.report(out, location, actual, expected, Some(description));
                    return Ok(());
                };
                self.compare_maps(location, actual, expected, actual_map, expected_map, out)
            }
            _ if actual.is_leaf() && expected.is_leaf() => {
                if actual.leaf_eq(expected) == Some(false) {
                    let description = if actual.type_name() == expected.type_name() {
                        format!(
                            "actual and expected values are both standard types ({}) and were compared with natural equality",
                            actual.type_name()
                        )
                    } else {
                        format!(
                            "actual and expected values are both standard types ({} and {}) and were compared with natural equality",
                            actual.type_name(),
                            expected.type_name()
                        )
                    };
                    self.report(out, location, actual, expected, Some(description));
                }
                Ok(())
            }
            Value::Object(expected_object) => match actual {
                Value::Object(actual_object) => {
                    self.compare_objects(location, actual, expected, actual_object, expected_object, out)
                }
                _ => {
                    self.report_kind_mismatch(location, actual, expected, out);
                    Ok(())
                }
            },
            _ => {
                self.report_kind_mismatch(location, actual, expected, out);
                Ok(())
            }
        }
    }

    fn compare_as_enums(
        &self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        out: &mut Vec<ComparisonDifference>,
    ) {
        let equal = match (actual, expected) {
            (Value::Enum(a), Value::Enum(e)) => {
                let same_type = !self.config.is_in_strict_type_checking_mode() || a.type_name == e.type_name;
                same_type && a.variant == e.variant
            }
            (Value::Enum(a), Value::Str(s)) | (Value::Str(s), Value::Enum(a))
                if self.config.allows_comparing_enum_against_string() =>
            {
                a.variant == *s
            }
            _ => {
                let description = if expected.is_enum() {
                    different_type_message("an enum", actual)
                } else {
                    format!(
                        "expected field is a {} but actual field is an enum",
                        expected.type_name()
                    )
                };
                self.report(out, location, actual, expected, Some(description));
                return;
            }
        };
        if !equal {
            self.report(out, location, actual, expected, None);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn same_size(
        &self,
        kind: &str,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        actual_size: usize,
        expected_size: usize,
        out: &mut Vec<ComparisonDifference>,
    ) -> bool {
        if actual_size == expected_size {
            return true;
        }
        let description = different_size_message(kind, actual_size, expected_size);
        self.report(out, location, actual, expected, Some(description));
        false
    }

    fn compare_ordered(
        &mut self,
        location: &FieldLocation,
        actual: &Seq,
        expected: &Seq,
        out: &mut Vec<ComparisonDifference>,
    ) -> Result<(), ExError> {
        for (index, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            self.compare_node(&location.element(index), a, e, out)?;
        }
        Ok(())
    }

    /// Match every expected element against a distinct actual element
    fn compare_unordered(
        &mut self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        actual_seq: &Seq,
        expected_seq: &Seq,
        out: &mut Vec<ComparisonDifference>,
    ) -> Result<(), ExError> {
        let mut unmatched_actual: Vec<&Value> = actual_seq.iter().collect();
        let mut not_found: Vec<Value> = Vec::new();
        for (index, expected_element) in expected_seq.iter().enumerate() {
            let element_location = location.element(index);
            let mut matched = None;
            for (position, actual_element) in unmatched_actual.iter().enumerate() {
                if self.is_match(&element_location, actual_element, expected_element)? {
                    matched = Some(position);
                    break;
                }
            }
            match matched {
                Some(position) => {
                    unmatched_actual.remove(position);
                }
                None => not_found.push(expected_element.clone()),
            }
        }
        if !not_found.is_empty() {
            let description = format!(
                "The following expected elements were not matched in the actual {}:\n  {}",
                actual.type_name(),
                Value::list(not_found)
            );
            self.report(out, location, actual, expected, Some(description));
        }
        Ok(())
    }

    /// Trial comparison sharing the ancestor chain, differences discarded
    fn is_match(
        &mut self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
    ) -> Result<bool, ExError> {
        let mut trial = Vec::new();
        self.compare_node(location, actual, expected, &mut trial)?;
        Ok(trial.is_empty())
    }

    fn compare_maps(
        &mut self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        actual_map: &MapRef,
        expected_map: &MapRef,
        out: &mut Vec<ComparisonDifference>,
    ) -> Result<(), ExError> {
        let actual_entries = self.keyed_entries(location, actual_map);
        let expected_entries = self.keyed_entries(location, expected_map);
        let actual_size: usize = actual_entries.values().map(Vec::len).sum();
        let expected_size: usize = expected_entries.values().map(Vec::len).sum();

        let mut pairs: Vec<(&KeyedEntry, &KeyedEntry)> = Vec::new();
        let mut keys_not_in_actual: Vec<Value> = Vec::new();
        let mut keys_not_in_expected: Vec<Value> = Vec::new();
        for (rendered, expected_group) in &expected_entries {
            let Some(actual_group) = actual_entries.get(rendered) else {
                keys_not_in_actual.extend(expected_group.iter().map(|entry| entry.key.clone()));
                continue;
            };
            if let ([actual_entry], [expected_entry]) = (actual_group.as_slice(), expected_group.as_slice()) {
                pairs.push((actual_entry, expected_entry));
                continue;
            }
            // distinct keys rendering alike are told apart by comparing the keys themselves
            let mut unmatched: Vec<&KeyedEntry> = actual_group.iter().collect();
            for expected_entry in expected_group {
                let key_location = location.field(&expected_entry.segment);
                let mut matched = None;
                for (position, actual_entry) in unmatched.iter().enumerate() {
                    if self.is_match(&key_location, &actual_entry.key, &expected_entry.key)? {
                        matched = Some(position);
                        break;
                    }
                }
                match matched {
                    Some(position) => pairs.push((unmatched.remove(position), expected_entry)),
                    None => keys_not_in_actual.push(expected_entry.key.clone()),
                }
            }
            keys_not_in_expected.extend(unmatched.iter().map(|entry| entry.key.clone()));
        }
        for (rendered, actual_group) in &actual_entries {
            if !expected_entries.contains_key(rendered) {
                keys_not_in_expected.extend(actual_group.iter().map(|entry| entry.key.clone()));
            }
        }

        let mut description = String::new();
        if actual_size != expected_size {
            description.push_str(&different_size_message("maps", actual_size, expected_size));
        }
        if !keys_not_in_actual.is_empty() {
            push_line(
                &mut description,
                format!(
                    "The following keys were not found in the actual map value:\n  {}",
                    Value::list(keys_not_in_actual)
                ),
            );
        }
        if !keys_not_in_expected.is_empty() {
            push_line(
                &mut description,
                format!(
                    "The following keys were present in the actual map value, but not in the expected map value:\n  {}",
                    Value::list(keys_not_in_expected)
                ),
            );
        }
        if !description.is_empty() {
            self.report(out, location, actual, expected, Some(description));
        }

        for (actual_entry, expected_entry) in pairs {
            let value_location = location.field(&expected_entry.segment);
            self.compare_node(&value_location, &actual_entry.value, &expected_entry.value, out)?;
        }
        Ok(())
    }

    /// Map entries grouped by rendered key, ignored keys filtered out
    fn keyed_entries(&self, location: &FieldLocation, map: &MapRef) -> BTreeMap<String, Vec<KeyedEntry>> {
        let mut entries: BTreeMap<String, Vec<KeyedEntry>> = BTreeMap::new();
        for (key, value) in map.entries() {
            let segment = key_segment(key);
            if self.config.is_ignored_location(&location.field(&segment)) {
                continue;
            }
            entries.entry(key.to_string()).or_default().push(KeyedEntry {
                key: key.clone(),
                segment,
                value: value.clone(),
            });
        }
        entries
    }

    fn compare_objects(
        &mut self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        actual_object: &ObjectRef,
        expected_object: &ObjectRef,
        out: &mut Vec<ComparisonDifference>,
    ) -> Result<(), ExError> {
        let actual_type = actual_object.type_name();
        let expected_type = expected_object.type_name();
        if actual_type != expected_type {
            if self.config.is_in_strict_type_checking_mode() {
                let description = strict_type_message(actual, expected);
                self.report(out, location, actual, expected, Some(description));
                return Ok(());
            }
            let is_variant = |o: &ObjectRef| o.borrow().kind() == ObjectKind::Variant;
            if is_variant(actual_object) || is_variant(expected_object) {
                let description = format!(
                    "actual and expected values are different enum variants ({} and {})",
                    actual_type, expected_type
                );
                self.report(out, location, actual, expected, Some(description));
                return Ok(());
            }
        }

        let actual_names = self.member_names_to_compare(location, actual_object);
        let expected_names = self.member_names_to_compare(location, expected_object);

        if !self.config.skips_absent_members() {
            let missing: Vec<&String> = expected_names
                .iter()
                .filter(|n| !actual_names.contains(*n))
                .collect();
            let extra: Vec<&String> = actual_names
                .iter()
                .filter(|n| !expected_names.contains(*n))
                .collect();
            let description = match (missing.is_empty(), extra.is_empty()) {
                (true, true) => None,
                (false, true) => Some(format!(
                    "actual value had less fields to compare than expected value, it did not have these fields: {}",
                    names_list(&missing)
                )),
                (true, false) => Some(format!(
                    "actual value had more fields to compare than expected value, these actual fields could not be found in expected: {}",
                    names_list(&extra)
                )),
                (false, false) => Some(format!(
                    "actual value and expected value fields to compare differ:\n- actual value had less fields to compare than expected value, it did not have these fields: {}\n- actual value had more fields to compare than expected value, these actual fields could not be found in expected: {}",
                    names_list(&missing),
                    names_list(&extra)
                )),
            };
            if let Some(description) = description {
                self.report(out, location, actual, expected, Some(description));
            }
        }

        let config = self.config;
        let strategy = config.introspection();
        for name in actual_names.iter().filter(|n| expected_names.contains(*n)) {
            let member_location = location.field(name);
            let actual_member = read_member(strategy, actual_object, name, &member_location)?;
            let expected_member = read_member(strategy, expected_object, name, &member_location)?;
            self.compare_node(&member_location, &actual_member, &expected_member, out)?;
        }
        Ok(())
    }

    /// Members listed by the strategy minus ignored, out-of-scope and transient ones
    fn member_names_to_compare(&self, location: &FieldLocation, object: &ObjectRef) -> Vec<String> {
        let strategy = self.config.introspection();
        let object = object.borrow();
        strategy
            .member_names(&object)
            .into_iter()
            .filter(|name| {
                let member_location = location.field(name);
                !self.config.is_ignored_location(&member_location)
                    && self.config.is_compared(&member_location)
                    && !(self.config.ignores_transient_members()
                        && strategy.is_transient(&object, name))
            })
            .collect()
    }

    fn report_kind_mismatch(
        &self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        out: &mut Vec<ComparisonDifference>,
    ) {
        let description = if actual.is_leaf() {
            format!(
                "actual value is a standard type ({}) and expected is not ({})",
                actual.type_name(),
                expected.type_name()
            )
        } else if expected.is_leaf() {
            format!(
                "expected value is a standard type ({}) and actual is not ({})",
                expected.type_name(),
                actual.type_name()
            )
        } else {
            format!(
                "actual field is a {} but expected field is not ({})",
                actual.type_name(),
                expected.type_name()
            )
        };
        self.report(out, location, actual, expected, Some(description));
    }

    fn report(
        &self,
        out: &mut Vec<ComparisonDifference>,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
        description: Option<String>,
    ) {
        let mut difference = ComparisonDifference::new(location.clone(), actual.clone(), expected.clone())
            .with_custom_message(self.config.message_for(location, actual, expected));
        difference.description = description;
        out.push(difference);
    }
}

struct KeyedEntry {
    key: Value,
    segment: String,
    value: Value,
}

fn read_member(
    strategy: &dyn crate::introspection::IntrospectionStrategy,
    object: &ObjectRef,
    name: &str,
    location: &FieldLocation,
) -> Result<Value, ExError> {
    strategy
        .read_member(&object.borrow(), name)
        .map_err(|e| e.with_path(location.path()).with_op("compare"))
}

fn types_differ(actual: &Value, expected: &Value) -> bool {
    !actual.is_null() && !expected.is_null() && actual.type_name() != expected.type_name()
}

fn strict_type_message(actual: &Value, expected: &Value) -> String {
    format!(
        "{} {} is not equal to the expected value type {}",
        STRICT_TYPE_ERROR,
        actual.type_name(),
        expected.type_name()
    )
}

fn different_type_message(expected_description: &str, actual: &Value) -> String {
    format!(
        "expected field is {} but actual field is not ({})",
        expected_description,
        actual.type_name()
    )
}

fn different_size_message(kind: &str, actual_size: usize, expected_size: usize) -> String {
    format!(
        "actual and expected values are {} of different size, actual size={} when expected size={}",
        kind, actual_size, expected_size
    )
}

/// Path segment for a map key: strings unquoted, everything else as displayed
fn key_segment(key: &Value) -> String {
    match key {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

fn names_list(names: &[&String]) -> String {
    let names: BTreeSet<&str> = names.iter().map(|n| n.as_str()).collect();
    format!("[{}]", names.into_iter().collect::<Vec<_>>().join(", "))
}

fn push_line(buffer: &mut String, line: String) {
    if !buffer.is_empty() {
        buffer.push('\n');
    }
    buffer.push_str(&line);
}

/// Compare two value graphs and return every difference, in traversal order.
///
/// An empty result means `actual` is recursively equal to `expected` under
/// `config`. Mismatches are data; only configuration and introspection
/// failures are errors.
///
/// # Errors
///
/// - `UnknownComparedField` - a compare-only path names a member the root actual value lacks
/// - `UnreadableMember` - the introspection strategy listed a member it cannot read
pub fn compare(
    actual: &Value,
    expected: &Value,
    config: &ComparisonConfiguration,
) -> Result<Vec<ComparisonDifference>, ExError> {
    let comparison_id = ComparisonId::new();
    let span = tracing::debug_span!("compare", comparison_id = %comparison_id);
    let _guard = span.enter();

    let start = Instant::now();
    log_op_start!("compare", type_name = %expected.type_name());

    match ComparisonState::new(config).run(actual, expected) {
        Ok(differences) => {
            log_op_end!(
                "compare",
                duration_ms = start.elapsed().as_millis() as u64,
                differences = differences.len() as u64
            );
            Ok(differences)
        }
        Err(err) => {
            let err = err.with_comparison_id(comparison_id);
            log_op_error!(
                "compare",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

/// Lower both sides through the serde bridge, then [`compare`] them
///
/// # Errors
///
/// - `Serialization` - either side failed to serialize
/// - any error [`compare`] returns
pub fn compare_serializable<A, E>(
    actual: &A,
    expected: &E,
    config: &ComparisonConfiguration,
) -> Result<Vec<ComparisonDifference>, ExError>
where
    A: Serialize + ?Sized,
    E: Serialize + ?Sized,
{
    let actual = to_value(actual).map_err(|e| e.with_op("compare_serializable"))?;
    let expected = to_value(expected).map_err(|e| e.with_op("compare_serializable"))?;
    compare(&actual, &expected, config)
}

/// A configuration bound to the comparisons it runs
#[derive(Debug, Clone, Default)]
pub struct RecursiveComparator {
    config: ComparisonConfiguration,
}

impl RecursiveComparator {
    pub fn new(config: ComparisonConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparisonConfiguration {
        &self.config
    }

    /// # Errors
    ///
    /// See [`compare`].
    pub fn compare(
        &self,
        actual: &Value,
        expected: &Value,
    ) -> Result<Vec<ComparisonDifference>, ExError> {
        compare(actual, expected, &self.config)
    }

    /// # Errors
    ///
    /// See [`compare_serializable`].
    pub fn compare_serializable<A, E>(
        &self,
        actual: &A,
        expected: &E,
    ) -> Result<Vec<ComparisonDifference>, ExError>
    where
        A: Serialize + ?Sized,
        E: Serialize + ?Sized,
    {
        compare_serializable(actual, expected, &self.config)
    }

    /// # Errors
    ///
    /// See [`compare`].
    pub fn is_equal(&self, actual: &Value, expected: &Value) -> Result<bool, ExError> {
        Ok(self.compare(actual, expected)?.is_empty())
    }
}
