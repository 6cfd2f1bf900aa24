//! deepeq Core - recursive, field-by-field comparison of object graphs
//!
//! This crate compares an `actual` and an `expected` value structurally and
//! reports every mismatch with its field path, including:
//! - A dynamic value graph with shared, identity-bearing nodes (cycles allowed)
//! - A serde bridge lowering any `Serialize` type into that graph
//! - Configurable ignores, comparators, equality predicates and messages
//! - Pluggable introspection strategies
//! - Strict or lenient type checking
//!
//! ```
//! use deepeq_core::{compare_serializable, ComparisonConfiguration};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Address {
//!     number: u32,
//!     street: String,
//! }
//!
//! let config = ComparisonConfiguration::default();
//! let actual = Address { number: 1, street: "Main".to_string() };
//! let expected = Address { number: 2, street: "Main".to_string() };
//!
//! let differences = compare_serializable(&actual, &expected, &config).unwrap();
//! assert_eq!(differences.len(), 1);
//! assert_eq!(differences[0].path(), "number");
//! ```

pub mod assertion;
pub mod config;
pub mod diff;
pub mod errors;
pub mod introspection;
pub mod location;
pub mod logging_facility;
pub mod value;

// Re-export commonly used types
pub use assertion::{assert_that, assert_that_value, ComparisonFailure};
pub use config::{ComparisonConfiguration, ComparisonConfigurationBuilder, ComparisonSettings};
pub use diff::{compare, compare_serializable, ComparisonDifference, RecursiveComparator};
pub use errors::{DeepEqError, ExError, ExErrorKind};
pub use introspection::{DeclaredMembers, IntrospectionStrategy, NormalizedMembers};
pub use location::FieldLocation;
pub use value::{to_value, Object, ObjectRef, Value};
