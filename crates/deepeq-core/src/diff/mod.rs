//! Recursive comparison of value graphs.
//!
//! Walks `actual` and `expected` side by side and produces a flat, ordered
//! list of field-level differences.
//!
//! ## Entry point
//!
//! ```
//! use deepeq_core::diff::compare;
//! use deepeq_core::value::Object;
//! use deepeq_core::ComparisonConfiguration;
//!
//! let actual = Object::new("Person").with_member("name", "John").into_value();
//! let expected = Object::new("Person").with_member("name", "Jack").into_value();
//!
//! let differences = compare(&actual, &expected, &ComparisonConfiguration::default()).unwrap();
//! assert_eq!(differences[0].path(), "name");
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs and configuration produce the same
//!   differences in the same order (depth first, members in introspection
//!   order, map keys ascending, elements by index).
//! - **Termination**: cyclic graphs are compared without looping; a back
//!   reference to a pair already being compared counts as equal.
//! - **Reflexivity**: a value always equals itself, whatever the configuration.
//! - **No short-circuit**: every difference is reported, not just the first.

pub mod engine;
pub mod model;

pub use engine::{compare, compare_serializable, RecursiveComparator};
pub use model::ComparisonDifference;
