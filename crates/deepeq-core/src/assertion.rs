//! Thin assertion surface over the recursive comparator.
//!
//! ```
//! use deepeq_core::assertion::assert_that;
//! use deepeq_core::ComparisonConfiguration;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Person {
//!     name: String,
//!     id: u64,
//! }
//!
//! let config = ComparisonConfiguration::builder()
//!     .with_ignored_fields(["id"])
//!     .build()
//!     .unwrap();
//! let actual = Person { name: "John".to_string(), id: 1 };
//! let expected = Person { name: "John".to_string(), id: 2 };
//!
//! assert_that(&actual)
//!     .using_recursive_comparison(config)
//!     .is_equal_to(&expected);
//! ```

use crate::config::ComparisonConfiguration;
use crate::diff::engine::compare;
use crate::diff::model::ComparisonDifference;
use crate::errors::ExError;
use crate::value::{to_value, Value};
use serde::Serialize;
use thiserror::Error;

/// Why a recursive equality check did not pass
#[derive(Debug, Error)]
pub enum ComparisonFailure {
    #[error("{}", render_differences(.actual, .expected, .differences, .configuration))]
    Differences {
        actual: Value,
        expected: Value,
        differences: Vec<ComparisonDifference>,
        /// Summary of the configuration the comparison ran with
        configuration: String,
    },

    #[error("Expecting actual:\n  {actual}\nnot to be equal to:\n  {expected}\nwhen recursively comparing field by field")]
    UnexpectedlyEqual { actual: Value, expected: Value },

    /// The comparison could not run
    #[error(transparent)]
    Error(#[from] ExError),
}

impl ComparisonFailure {
    /// The differences found, empty for other failures
    pub fn differences(&self) -> &[ComparisonDifference] {
        match self {
            ComparisonFailure::Differences { differences, .. } => differences,
            _ => &[],
        }
    }
}

fn render_differences(
    actual: &Value,
    expected: &Value,
    differences: &[ComparisonDifference],
    configuration: &str,
) -> String {
    let plural = if differences.len() == 1 { "" } else { "s" };
    let lines = differences
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Expecting actual:\n  {}\nto be equal to:\n  {}\nwhen recursively comparing field by field, but found the following {} difference{}:\n\n{}\n\nThe recursive comparison was performed with this configuration:\n{}",
        actual,
        expected,
        differences.len(),
        plural,
        lines,
        configuration
    )
}

/// Entry point for serializable values
pub fn assert_that<T: Serialize + ?Sized>(actual: &T) -> ObjectAssert {
    ObjectAssert {
        actual: to_value(actual),
    }
}

/// Entry point for prebuilt value graphs (cycles, transient members, custom objects)
pub fn assert_that_value(actual: &Value) -> ObjectAssert {
    ObjectAssert {
        actual: Ok(actual.clone()),
    }
}

pub struct ObjectAssert {
    actual: Result<Value, ExError>,
}

impl ObjectAssert {
    pub fn using_recursive_comparison(
        self,
        config: ComparisonConfiguration,
    ) -> RecursiveComparisonAssert {
        RecursiveComparisonAssert {
            actual: self.actual,
            config,
        }
    }

    /// Recursive comparison with the default configuration
    pub fn using_default_recursive_comparison(self) -> RecursiveComparisonAssert {
        self.using_recursive_comparison(ComparisonConfiguration::default())
    }
}

pub struct RecursiveComparisonAssert {
    actual: Result<Value, ExError>,
    config: ComparisonConfiguration,
}

impl RecursiveComparisonAssert {
    /// # Errors
    ///
    /// - `ComparisonFailure::Differences` - at least one difference was found
    /// - `ComparisonFailure::Error` - a side could not be lowered or the comparison failed
    pub fn check_equal_to<E: Serialize + ?Sized>(&self, expected: &E) -> Result<(), ComparisonFailure> {
        let expected = to_value(expected)?;
        self.check_equal_to_value(&expected)
    }

    /// # Errors
    ///
    /// See [`check_equal_to`](Self::check_equal_to).
    pub fn check_equal_to_value(&self, expected: &Value) -> Result<(), ComparisonFailure> {
        let actual = self.actual.clone()?;
        let differences = compare(&actual, expected, &self.config)?;
        if differences.is_empty() {
            return Ok(());
        }
        Err(ComparisonFailure::Differences {
            actual,
            expected: expected.clone(),
            differences,
            configuration: self.config.describe(),
        })
    }

    /// # Errors
    ///
    /// - `ComparisonFailure::UnexpectedlyEqual` - no difference was found
    /// - `ComparisonFailure::Error` - a side could not be lowered or the comparison failed
    pub fn check_not_equal_to<E: Serialize + ?Sized>(
        &self,
        expected: &E,
    ) -> Result<(), ComparisonFailure> {
        let expected = to_value(expected)?;
        self.check_not_equal_to_value(&expected)
    }

    /// # Errors
    ///
    /// See [`check_not_equal_to`](Self::check_not_equal_to).
    pub fn check_not_equal_to_value(&self, expected: &Value) -> Result<(), ComparisonFailure> {
        match self.check_equal_to_value(expected) {
            Ok(()) => Err(ComparisonFailure::UnexpectedlyEqual {
                actual: self.actual.clone()?,
                expected: expected.clone(),
            }),
            Err(ComparisonFailure::Differences { .. }) => Ok(()),
            Err(other) => Err(other),
        }
    }

    /// # Panics
    ///
    /// Panics with every difference, one block each, when the values differ
    /// or when the comparison could not run.
    #[track_caller]
    pub fn is_equal_to<E: Serialize + ?Sized>(&self, expected: &E) -> &Self {
        if let Err(failure) = self.check_equal_to(expected) {
            panic!("{}", failure);
        }
        self
    }

    /// # Panics
    ///
    /// See [`is_equal_to`](Self::is_equal_to).
    #[track_caller]
    pub fn is_equal_to_value(&self, expected: &Value) -> &Self {
        if let Err(failure) = self.check_equal_to_value(expected) {
            panic!("{}", failure);
        }
        self
    }

    /// # Panics
    ///
    /// Panics when the values are recursively equal or when the comparison
    /// could not run.
    #[track_caller]
    pub fn is_not_equal_to<E: Serialize + ?Sized>(&self, expected: &E) -> &Self {
        if let Err(failure) = self.check_not_equal_to(expected) {
            panic!("{}", failure);
        }
        self
    }

    /// # Panics
    ///
    /// See [`is_not_equal_to`](Self::is_not_equal_to).
    #[track_caller]
    pub fn is_not_equal_to_value(&self, expected: &Value) -> &Self {
        if let Err(failure) = self.check_not_equal_to_value(expected) {
            panic!("{}", failure);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: u32,
    }

    fn person(name: &str, age: u32) -> Person {
        Person {
            name: name.to_string(),
            age,
        }
    }

    #[test]
    fn test_equal_values_pass() {
        assert_that(&person("John", 42))
            .using_default_recursive_comparison()
            .is_equal_to(&person("John", 42))
            .is_not_equal_to(&person("Jack", 42));
    }

    #[test]
    fn test_failure_lists_each_difference() {
        let failure = assert_that(&person("John", 42))
            .using_default_recursive_comparison()
            .check_equal_to(&person("Jack", 43))
            .unwrap_err();

        assert_eq!(failure.differences().len(), 2);
        let message = failure.to_string();
        assert!(message.contains("found the following 2 differences"));
        assert!(message.contains("field/property 'name' differ:"));
        assert!(message.contains("field/property 'age' differ:"));
        assert!(message.contains("lenient type checking"));
    }

    #[test]
    fn test_unexpectedly_equal() {
        let failure = assert_that(&person("John", 42))
            .using_default_recursive_comparison()
            .check_not_equal_to(&person("John", 42))
            .unwrap_err();
        assert!(matches!(failure, ComparisonFailure::UnexpectedlyEqual { .. }));
    }

    #[test]
    #[should_panic(expected = "field/property 'age' differ")]
    fn test_is_equal_to_panics_on_difference() {
        assert_that(&person("John", 42))
            .using_default_recursive_comparison()
            .is_equal_to(&person("John", 43));
    }
}
