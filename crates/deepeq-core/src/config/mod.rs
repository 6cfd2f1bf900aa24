//! Recursive comparison configuration.
//!
//! A [`ComparisonConfiguration`] is immutable once built and is passed to
//! every comparison explicitly. It is `Send + Sync` and cheap to clone, so a
//! single configuration can be reused by unrelated comparisons on different
//! threads.
//!
//! ## Rule matching
//!
//! Every field rule (ignores, overrides, messages, collection order) matches
//! the *rules path* of a node, i.e. its dotted path with element indices
//! removed: ignoring `group.name` ignores `group.[0].name`, `group.[1].name`
//! and so on. Regexes must match the whole rules path.

pub mod overrides;
pub mod settings;

pub use overrides::{ComparatorFn, EqualsFn, Override, OverrideSource};
pub use settings::ComparisonSettings;

use crate::errors::{DeepEqError, ExError};
use crate::introspection::{DeclaredMembers, IntrospectionStrategy};
use crate::location::FieldLocation;
use crate::value::Value;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::Arc;

/// Immutable configuration of one or more recursive comparisons
#[derive(Clone)]
pub struct ComparisonConfiguration {
    strict_type_checking: bool,
    ignored_fields: BTreeSet<String>,
    ignored_field_regexes: Vec<Regex>,
    ignored_types: BTreeSet<String>,
    ignore_transient_members: bool,
    ignore_all_actual_null_fields: bool,
    ignore_all_expected_null_fields: bool,
    compared_fields: Vec<FieldLocation>,
    skip_absent_members: bool,
    ignore_collection_order: bool,
    ignored_collection_order_in_fields: BTreeSet<String>,
    ignored_collection_order_in_field_regexes: Vec<Regex>,
    treat_null_and_empty_collections_as_equal: bool,
    allow_comparing_enum_against_string: bool,
    field_overrides: BTreeMap<String, Override>,
    field_regex_overrides: Vec<(Regex, Override)>,
    type_overrides: BTreeMap<String, Override>,
    type_pair_overrides: BTreeMap<(String, String), Override>,
    field_messages: BTreeMap<String, String>,
    type_messages: BTreeMap<String, String>,
    introspection: Arc<dyn IntrospectionStrategy>,
}

impl Default for ComparisonConfiguration {
    fn default() -> Self {
        Self {
            strict_type_checking: false,
            ignored_fields: BTreeSet::new(),
            ignored_field_regexes: Vec::new(),
            ignored_types: BTreeSet::new(),
            ignore_transient_members: false,
            ignore_all_actual_null_fields: false,
            ignore_all_expected_null_fields: false,
            compared_fields: Vec::new(),
            skip_absent_members: false,
            ignore_collection_order: false,
            ignored_collection_order_in_fields: BTreeSet::new(),
            ignored_collection_order_in_field_regexes: Vec::new(),
            treat_null_and_empty_collections_as_equal: false,
            allow_comparing_enum_against_string: false,
            field_overrides: BTreeMap::new(),
            field_regex_overrides: Vec::new(),
            type_overrides: BTreeMap::new(),
            type_pair_overrides: BTreeMap::new(),
            field_messages: BTreeMap::new(),
            type_messages: BTreeMap::new(),
            introspection: Arc::new(DeclaredMembers),
        }
    }
}

impl std::fmt::Debug for ComparisonConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl ComparisonConfiguration {
    pub fn builder() -> ComparisonConfigurationBuilder {
        ComparisonConfigurationBuilder::default()
    }

    pub fn is_in_strict_type_checking_mode(&self) -> bool {
        self.strict_type_checking
    }

    pub fn introspection(&self) -> &dyn IntrospectionStrategy {
        self.introspection.as_ref()
    }

    pub fn ignores_transient_members(&self) -> bool {
        self.ignore_transient_members
    }

    pub fn skips_absent_members(&self) -> bool {
        self.skip_absent_members
    }

    pub fn treats_null_and_empty_collections_as_equal(&self) -> bool {
        self.treat_null_and_empty_collections_as_equal
    }

    pub fn allows_comparing_enum_against_string(&self) -> bool {
        self.allow_comparing_enum_against_string
    }

    pub fn compared_fields(&self) -> &[FieldLocation] {
        &self.compared_fields
    }

    /// Ignored by exact rules path or by a field regex
    pub fn is_ignored_location(&self, location: &FieldLocation) -> bool {
        if location.is_root() {
            return false;
        }
        let rules_path = location.rules_path();
        self.ignored_fields.contains(&rules_path)
            || self
                .ignored_field_regexes
                .iter()
                .any(|regex| regex.is_match(&rules_path))
    }

    /// Ignored because of its location, its type or its null-ness
    pub fn should_ignore(&self, location: &FieldLocation, actual: &Value, expected: &Value) -> bool {
        if location.is_root() {
            return false;
        }
        if self.is_ignored_location(location) {
            return true;
        }
        if self.ignore_all_actual_null_fields && actual.is_null() {
            return true;
        }
        if self.ignore_all_expected_null_fields && expected.is_null() {
            return true;
        }
        self.matches_an_ignored_type(actual, expected)
    }

    fn matches_an_ignored_type(&self, actual: &Value, expected: &Value) -> bool {
        if self.ignored_types.is_empty() {
            return false;
        }
        if !actual.is_null() {
            return self.ignored_types.contains(&actual.type_name());
        }
        // actual null: only strict mode lets expected's type decide
        self.strict_type_checking
            && !expected.is_null()
            && self.ignored_types.contains(&expected.type_name())
    }

    /// Whether a node is inside the compare-only scope (always true without compared fields)
    pub fn is_compared(&self, location: &FieldLocation) -> bool {
        if self.compared_fields.is_empty() || location.is_root() {
            return true;
        }
        // in scope when on or under a compared field, or on the way down to one
        let hierarchy = location.hierarchy();
        self.compared_fields.iter().any(|compared| {
            hierarchy.contains(&compared.rules_path()) || compared.has_parent(location)
        })
    }

    /// Resolve the override deciding a node: field > field regex > type pair > type
    pub fn override_for(
        &self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
    ) -> Option<(&Override, OverrideSource)> {
        let rules_path = location.rules_path();
        if let Some(o) = self.field_overrides.get(&rules_path) {
            return Some((o, OverrideSource::Field(rules_path)));
        }
        if !location.is_root() {
            if let Some((regex, o)) = self
                .field_regex_overrides
                .iter()
                .find(|(regex, _)| regex.is_match(&rules_path))
            {
                return Some((o, OverrideSource::FieldRegex(strip_anchors(regex.as_str()))));
            }
        }
        if actual.is_null() && expected.is_null() {
            return None;
        }
        let actual_type = actual.type_name();
        let expected_type = expected.type_name();
        let pair = (actual_type, expected_type);
        if let Some(o) = self.type_pair_overrides.get(&pair) {
            let (a, e) = pair;
            return Some((o, OverrideSource::TypePair(a, e)));
        }
        let value_type = if actual.is_null() { pair.1 } else { pair.0 };
        self.type_overrides
            .get(&value_type)
            .map(|o| (o, OverrideSource::Type(value_type)))
    }

    /// Custom message for a difference at this node; field messages beat type messages
    pub fn message_for(
        &self,
        location: &FieldLocation,
        actual: &Value,
        expected: &Value,
    ) -> Option<String> {
        if let Some(message) = self.field_messages.get(&location.rules_path()) {
            return Some(message.clone());
        }
        let value_type = if !actual.is_null() {
            actual.type_name()
        } else if !expected.is_null() {
            expected.type_name()
        } else {
            return None;
        };
        self.type_messages.get(&value_type).cloned()
    }

    pub fn should_ignore_collection_order(&self, location: &FieldLocation) -> bool {
        if self.ignore_collection_order {
            return true;
        }
        let rules_path = location.rules_path();
        self.ignored_collection_order_in_fields.contains(&rules_path)
            || self
                .ignored_collection_order_in_field_regexes
                .iter()
                .any(|regex| regex.is_match(&rules_path))
    }

    /// Multi-line, human readable summary of the active rules
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "- {} type checking",
            if self.strict_type_checking {
                "strict"
            } else {
                "lenient"
            }
        );
        let _ = writeln!(out, "- introspection: {}", self.introspection.description());
        if !self.ignored_fields.is_empty() {
            let _ = writeln!(out, "- ignored fields: {}", join(self.ignored_fields.iter()));
        }
        if !self.ignored_field_regexes.is_empty() {
            let _ = writeln!(
                out,
                "- ignored fields matching: {}",
                join(self.ignored_field_regexes.iter().map(|r| strip_anchors(r.as_str())))
            );
        }
        if !self.ignored_types.is_empty() {
            let _ = writeln!(out, "- ignored types: {}", join(self.ignored_types.iter()));
        }
        if self.ignore_transient_members {
            let _ = writeln!(out, "- transient members are ignored");
        }
        if self.ignore_all_actual_null_fields {
            let _ = writeln!(out, "- all actual null fields are ignored");
        }
        if self.ignore_all_expected_null_fields {
            let _ = writeln!(out, "- all expected null fields are ignored");
        }
        if !self.compared_fields.is_empty() {
            let _ = writeln!(
                out,
                "- only compared fields: {}",
                join(self.compared_fields.iter().map(FieldLocation::rules_path))
            );
        }
        if self.skip_absent_members {
            let _ = writeln!(out, "- members absent on one side are skipped");
        }
        if self.ignore_collection_order {
            let _ = writeln!(out, "- collection order is ignored");
        }
        if !self.ignored_collection_order_in_fields.is_empty() {
            let _ = writeln!(
                out,
                "- collection order is ignored in fields: {}",
                join(self.ignored_collection_order_in_fields.iter())
            );
        }
        if !self.ignored_collection_order_in_field_regexes.is_empty() {
            let _ = writeln!(
                out,
                "- collection order is ignored in fields matching: {}",
                join(
                    self.ignored_collection_order_in_field_regexes
                        .iter()
                        .map(|r| strip_anchors(r.as_str()))
                )
            );
        }
        if self.treat_null_and_empty_collections_as_equal {
            let _ = writeln!(out, "- null and empty collections are equal");
        }
        if self.allow_comparing_enum_against_string {
            let _ = writeln!(out, "- enums may be compared against strings");
        }
        for (path, o) in &self.field_overrides {
            let _ = writeln!(out, "- {:?} for field {}", o, path);
        }
        for (regex, o) in &self.field_regex_overrides {
            let _ = writeln!(out, "- {:?} for fields matching {}", o, strip_anchors(regex.as_str()));
        }
        for ((a, e), o) in &self.type_pair_overrides {
            let _ = writeln!(out, "- {:?} for types ({}, {})", o, a, e);
        }
        for (t, o) in &self.type_overrides {
            let _ = writeln!(out, "- {:?} for type {}", o, t);
        }
        for (path, message) in &self.field_messages {
            let _ = writeln!(out, "- message for field {}: {}", path, message);
        }
        for (t, message) in &self.type_messages {
            let _ = writeln!(out, "- message for type {}: {}", t, message);
        }
        out
    }
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_anchors(pattern: &str) -> String {
    pattern
        .strip_prefix("^(?:")
        .and_then(|p| p.strip_suffix(")$"))
        .unwrap_or(pattern)
        .to_string()
}

fn compile_full_match(pattern: &str) -> Result<Regex, ExError> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
        ExError::from(DeepEqError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
        .with_op("build_configuration")
    })
}

/// Builder for [`ComparisonConfiguration`]
///
/// Registering a second override, message or rule under the same key replaces
/// the first one.
#[derive(Default)]
pub struct ComparisonConfigurationBuilder {
    strict_type_checking: bool,
    ignored_fields: BTreeSet<String>,
    ignored_field_regexes: Vec<String>,
    ignored_types: BTreeSet<String>,
    ignore_transient_members: bool,
    ignore_all_actual_null_fields: bool,
    ignore_all_expected_null_fields: bool,
    compared_fields: Vec<String>,
    skip_absent_members: bool,
    ignore_collection_order: bool,
    ignored_collection_order_in_fields: BTreeSet<String>,
    ignored_collection_order_in_field_regexes: Vec<String>,
    treat_null_and_empty_collections_as_equal: bool,
    allow_comparing_enum_against_string: bool,
    field_overrides: BTreeMap<String, Override>,
    field_regex_overrides: Vec<(String, Override)>,
    type_overrides: BTreeMap<String, Override>,
    type_pair_overrides: BTreeMap<(String, String), Override>,
    field_messages: BTreeMap<String, String>,
    type_messages: BTreeMap<String, String>,
    introspection: Option<Arc<dyn IntrospectionStrategy>>,
}

fn strings<I, S>(items: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into)
}

impl ComparisonConfigurationBuilder {
    pub fn with_strict_type_checking(mut self, strict: bool) -> Self {
        self.strict_type_checking = strict;
        self
    }

    pub fn with_ignored_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_fields.extend(strings(fields));
        self
    }

    pub fn with_ignored_fields_matching_regexes<I, S>(mut self, regexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_field_regexes.extend(strings(regexes));
        self
    }

    pub fn with_ignored_fields_of_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_types.extend(strings(types));
        self
    }

    pub fn with_ignore_transient_members(mut self, ignore: bool) -> Self {
        self.ignore_transient_members = ignore;
        self
    }

    pub fn with_ignore_all_actual_null_fields(mut self, ignore: bool) -> Self {
        self.ignore_all_actual_null_fields = ignore;
        self
    }

    pub fn with_ignore_all_expected_null_fields(mut self, ignore: bool) -> Self {
        self.ignore_all_expected_null_fields = ignore;
        self
    }

    /// Restrict the comparison to these fields (and their sub-fields)
    pub fn with_compared_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compared_fields.extend(strings(fields));
        self
    }

    pub fn with_skip_absent_members(mut self, skip: bool) -> Self {
        self.skip_absent_members = skip;
        self
    }

    pub fn with_ignore_collection_order(mut self, ignore: bool) -> Self {
        self.ignore_collection_order = ignore;
        self
    }

    pub fn with_ignored_collection_order_in_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_collection_order_in_fields
            .extend(strings(fields));
        self
    }

    pub fn with_ignored_collection_order_in_fields_matching_regexes<I, S>(
        mut self,
        regexes: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_collection_order_in_field_regexes
            .extend(strings(regexes));
        self
    }

    pub fn with_treat_null_and_empty_collections_as_equal(mut self, treat: bool) -> Self {
        self.treat_null_and_empty_collections_as_equal = treat;
        self
    }

    pub fn with_allow_comparing_enum_against_string(mut self, allow: bool) -> Self {
        self.allow_comparing_enum_against_string = allow;
        self
    }

    pub fn with_comparator_for_fields<F, I, S>(mut self, comparator: F, fields: I) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let o = Override::comparator(comparator);
        for field in strings(fields) {
            self.field_overrides.insert(field, o.clone());
        }
        self
    }

    pub fn with_equals_for_fields<F, I, S>(mut self, equals: F, fields: I) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let o = Override::equals(equals);
        for field in strings(fields) {
            self.field_overrides.insert(field, o.clone());
        }
        self
    }

    pub fn with_comparator_for_fields_matching_regexes<F, I, S>(
        self,
        comparator: F,
        regexes: I,
    ) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_field_regex_override(Override::comparator(comparator), regexes)
    }

    pub fn with_equals_for_fields_matching_regexes<F, I, S>(self, equals: F, regexes: I) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_field_regex_override(Override::equals(equals), regexes)
    }

    /// Re-registering a regex drops its earlier override
    fn with_field_regex_override<I, S>(mut self, o: Override, regexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for regex in strings(regexes) {
            self.field_regex_overrides.retain(|(r, _)| *r != regex);
            self.field_regex_overrides.push((regex, o.clone()));
        }
        self
    }

    pub fn with_comparator_for_type<F>(mut self, comparator: F, type_name: impl Into<String>) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.type_overrides
            .insert(type_name.into(), Override::comparator(comparator));
        self
    }

    pub fn with_equals_for_type<F>(mut self, equals: F, type_name: impl Into<String>) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.type_overrides
            .insert(type_name.into(), Override::equals(equals));
        self
    }

    /// Ordering for an actual of one type compared against an expected of another
    pub fn with_comparator_for_types<F>(
        mut self,
        comparator: F,
        actual_type: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.type_pair_overrides.insert(
            (actual_type.into(), expected_type.into()),
            Override::comparator(comparator),
        );
        self
    }

    /// Equality for an actual of one type compared against an expected of another
    pub fn with_equals_for_types<F>(
        mut self,
        equals: F,
        actual_type: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.type_pair_overrides.insert(
            (actual_type.into(), expected_type.into()),
            Override::equals(equals),
        );
        self
    }

    pub fn with_error_message_for_fields<I, S>(mut self, message: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = message.into();
        for field in strings(fields) {
            self.field_messages.insert(field, message.clone());
        }
        self
    }

    pub fn with_error_message_for_type(
        mut self,
        message: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        self.type_messages.insert(type_name.into(), message.into());
        self
    }

    pub fn with_introspection_strategy(
        mut self,
        strategy: impl IntrospectionStrategy + 'static,
    ) -> Self {
        self.introspection = Some(Arc::new(strategy));
        self
    }

    /// Apply serializable settings on top of what was configured so far
    pub fn with_settings(mut self, settings: ComparisonSettings) -> Self {
        self.strict_type_checking |= settings.strict_type_checking;
        self.ignored_fields.extend(settings.ignored_fields);
        self.ignored_field_regexes
            .extend(settings.ignored_fields_matching_regexes);
        self.ignored_types.extend(settings.ignored_types);
        self.ignore_transient_members |= settings.ignore_transient_members;
        self.ignore_all_actual_null_fields |= settings.ignore_all_actual_null_fields;
        self.ignore_all_expected_null_fields |= settings.ignore_all_expected_null_fields;
        self.compared_fields.extend(settings.compared_fields);
        self.skip_absent_members |= settings.skip_absent_members;
        self.ignore_collection_order |= settings.ignore_collection_order;
        self.ignored_collection_order_in_fields
            .extend(settings.ignored_collection_order_in_fields);
        self.ignored_collection_order_in_field_regexes
            .extend(settings.ignored_collection_order_in_fields_matching_regexes);
        self.treat_null_and_empty_collections_as_equal |=
            settings.treat_null_and_empty_collections_as_equal;
        self.allow_comparing_enum_against_string |= settings.allow_comparing_enum_against_string;
        self.field_messages.extend(settings.field_messages);
        self.type_messages.extend(settings.type_messages);
        self
    }

    /// Validate and freeze the configuration
    ///
    /// # Errors
    ///
    /// - `InvalidRegex` - a field regex does not compile
    /// - `ConflictingOverrides` - a field is both ignored and explicitly compared
    pub fn build(self) -> Result<ComparisonConfiguration, ExError> {
        if let Some(field) = self
            .compared_fields
            .iter()
            .find(|f| self.ignored_fields.contains(*f))
        {
            return Err(ExError::from(DeepEqError::IgnoredAndCompared {
                field: field.clone(),
            })
            .with_op("build_configuration"));
        }

        let ignored_field_regexes = self
            .ignored_field_regexes
            .iter()
            .map(|p| compile_full_match(p))
            .collect::<Result<Vec<_>, _>>()?;
        let ignored_collection_order_in_field_regexes = self
            .ignored_collection_order_in_field_regexes
            .iter()
            .map(|p| compile_full_match(p))
            .collect::<Result<Vec<_>, _>>()?;
        let field_regex_overrides = self
            .field_regex_overrides
            .into_iter()
            .map(|(p, o)| compile_full_match(&p).map(|r| (r, o)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut compared_fields: Vec<FieldLocation> = Vec::new();
        for field in &self.compared_fields {
            let location = FieldLocation::parse(field);
            if !compared_fields.contains(&location) {
                compared_fields.push(location);
            }
        }

        Ok(ComparisonConfiguration {
            strict_type_checking: self.strict_type_checking,
            ignored_fields: self.ignored_fields,
            ignored_field_regexes,
            ignored_types: self.ignored_types,
            ignore_transient_members: self.ignore_transient_members,
            ignore_all_actual_null_fields: self.ignore_all_actual_null_fields,
            ignore_all_expected_null_fields: self.ignore_all_expected_null_fields,
            compared_fields,
            skip_absent_members: self.skip_absent_members,
            ignore_collection_order: self.ignore_collection_order,
            ignored_collection_order_in_fields: self.ignored_collection_order_in_fields,
            ignored_collection_order_in_field_regexes,
            treat_null_and_empty_collections_as_equal: self
                .treat_null_and_empty_collections_as_equal,
            allow_comparing_enum_against_string: self.allow_comparing_enum_against_string,
            field_overrides: self.field_overrides,
            field_regex_overrides,
            type_overrides: self.type_overrides,
            type_pair_overrides: self.type_pair_overrides,
            field_messages: self.field_messages,
            type_messages: self.type_messages,
            introspection: self
                .introspection
                .unwrap_or_else(|| Arc::new(DeclaredMembers)),
        })
    }
}
