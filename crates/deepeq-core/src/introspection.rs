//! Introspection strategies: how the comparator lists and reads members.
//!
//! The engine never looks at an object's members directly; it asks the
//! configured strategy, so alternative member models (renamed fields,
//! computed properties, schema-driven access) plug in without touching the
//! comparison algorithm.

use crate::errors::{DeepEqError, ExError};
use crate::value::{Object, Value};
use std::sync::Arc;

/// Enumerates and reads the comparable members of an object
pub trait IntrospectionStrategy: Send + Sync {
    /// Member names to compare, in a stable order
    fn member_names(&self, object: &Object) -> Vec<String>;

    /// Read a member previously returned by [`member_names`](Self::member_names)
    ///
    /// # Errors
    ///
    /// - `UnreadableMember` - the member is listed but cannot be read
    fn read_member(&self, object: &Object, name: &str) -> Result<Value, ExError>;

    /// Whether the member carries non-persistent intent
    fn is_transient(&self, object: &Object, name: &str) -> bool {
        let _ = (object, name);
        false
    }

    /// One-line description used in configuration summaries
    fn description(&self) -> String;
}

fn unreadable(object: &Object, name: &str) -> ExError {
    DeepEqError::UnreadableMember {
        member: name.to_string(),
        type_name: object.type_name().to_string(),
        path: String::new(),
    }
    .into()
}

/// Members in declaration order, read by exact name
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredMembers;

impl IntrospectionStrategy for DeclaredMembers {
    fn member_names(&self, object: &Object) -> Vec<String> {
        object.members().iter().map(|m| m.name.clone()).collect()
    }

    fn read_member(&self, object: &Object, name: &str) -> Result<Value, ExError> {
        object
            .member(name)
            .map(|m| m.value.clone())
            .ok_or_else(|| unreadable(object, name))
    }

    fn is_transient(&self, object: &Object, name: &str) -> bool {
        object.member(name).map(|m| m.transient).unwrap_or(false)
    }

    fn description(&self) -> String {
        "comparing declared members".to_string()
    }
}

/// Normalises member names before matching them across actual and expected
///
/// Useful when comparing a domain type with a DTO that spells its fields
/// differently (`first_name` vs `firstName`). The default normaliser lower
/// cases names and strips `_` and `-`.
#[derive(Clone)]
pub struct NormalizedMembers {
    normalize: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl NormalizedMembers {
    pub fn new(normalize: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            normalize: Arc::new(normalize),
        }
    }

    pub fn normalize(&self, name: &str) -> String {
        (self.normalize)(name)
    }
}

impl Default for NormalizedMembers {
    fn default() -> Self {
        Self::new(|name| {
            name.chars()
                .filter(|c| *c != '_' && *c != '-')
                .flat_map(char::to_lowercase)
                .collect()
        })
    }
}

impl IntrospectionStrategy for NormalizedMembers {
    fn member_names(&self, object: &Object) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for member in object.members() {
            let normalized = self.normalize(&member.name);
            if !names.contains(&normalized) {
                names.push(normalized);
            }
        }
        names
    }

    fn read_member(&self, object: &Object, name: &str) -> Result<Value, ExError> {
        object
            .members()
            .iter()
            .find(|m| self.normalize(&m.name) == name)
            .map(|m| m.value.clone())
            .ok_or_else(|| unreadable(object, name))
    }

    fn is_transient(&self, object: &Object, name: &str) -> bool {
        object
            .members()
            .iter()
            .find(|m| self.normalize(&m.name) == name)
            .map(|m| m.transient)
            .unwrap_or(false)
    }

    fn description(&self) -> String {
        "comparing normalized member names".to_string()
    }
}
