//! User supplied equality overrides.

use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub type ComparatorFn = dyn Fn(&Value, &Value) -> Ordering + Send + Sync;
pub type EqualsFn = dyn Fn(&Value, &Value) -> bool + Send + Sync;

/// A comparator or an equals predicate deciding a node on its own
#[derive(Clone)]
pub enum Override {
    /// Equal iff the comparator returns `Ordering::Equal`
    Comparator(Arc<ComparatorFn>),
    Equals(Arc<EqualsFn>),
}

impl Override {
    pub fn comparator(f: impl Fn(&Value, &Value) -> Ordering + Send + Sync + 'static) -> Self {
        Override::Comparator(Arc::new(f))
    }

    pub fn equals(f: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static) -> Self {
        Override::Equals(Arc::new(f))
    }

    pub fn are_equal(&self, actual: &Value, expected: &Value) -> bool {
        match self {
            Override::Comparator(cmp) => cmp(actual, expected) == Ordering::Equal,
            Override::Equals(eq) => eq(actual, expected),
        }
    }
}

impl fmt::Debug for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Override::Comparator(_) => f.write_str("Comparator"),
            Override::Equals(_) => f.write_str("Equals"),
        }
    }
}

/// Which rule an applied override came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideSource {
    Field(String),
    FieldRegex(String),
    TypePair(String, String),
    Type(String),
}

impl fmt::Display for OverrideSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideSource::Field(path) => write!(f, "field '{}'", path),
            OverrideSource::FieldRegex(regex) => write!(f, "fields matching '{}'", regex),
            OverrideSource::TypePair(a, e) => write!(f, "types ({}, {})", a, e),
            OverrideSource::Type(t) => write!(f, "type {}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_equal_only_on_ordering_equal() {
        let cmp = Override::comparator(|a, b| a.to_string().len().cmp(&b.to_string().len()));
        assert!(cmp.are_equal(&Value::from("ab"), &Value::from("cd")));
        assert!(!cmp.are_equal(&Value::from("ab"), &Value::from("cde")));
    }

    #[test]
    fn test_equals_predicate() {
        let eq = Override::equals(|_, _| true);
        assert!(eq.are_equal(&Value::from(1), &Value::Null));
    }
}
