#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Comparing plain Rust values through the serde bridge.

mod common;

use common::{paths, person, Address, Home};
use deepeq_core::errors::ExErrorKind;
use deepeq_core::{
    assert_that, compare_serializable, ComparisonConfiguration, ComparisonFailure,
    RecursiveComparator,
};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Serialize)]
struct PersonDto {
    name: String,
    age: u32,
    home: Home,
}

#[derive(Serialize)]
enum Shape {
    Point,
    Circle { radius: u32 },
    Square(u32),
}

#[derive(Serialize)]
struct Drawing {
    shapes: Vec<Shape>,
    label: Option<String>,
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

#[test]
fn test_nested_struct_difference_path() {
    let differences = compare_serializable(
        &person("John", 42, 1),
        &person("John", 42, 2),
        &ComparisonConfiguration::default(),
    )
    .unwrap();

    assert_eq!(paths(&differences), vec!["home.address.number"]);
    assert_eq!(
        differences[0].to_string(),
        "field/property 'home.address.number' differ:\n- actual value  : 1\n- expected value: 2\n\
         actual and expected values are both standard types (u64) and were compared with natural equality"
    );
}

#[test]
fn test_domain_type_against_dto() {
    let actual = person("John", 42, 1);
    let expected = PersonDto {
        name: "John".to_string(),
        age: 42,
        home: actual.home.clone(),
    };

    let lenient = compare_serializable(&actual, &expected, &ComparisonConfiguration::default())
        .unwrap();
    assert!(lenient.is_empty());

    let strict = ComparisonConfiguration::builder()
        .with_strict_type_checking(true)
        .build()
        .unwrap();
    let differences = compare_serializable(&actual, &expected, &strict).unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].path(), "");
}

#[test]
fn test_ignored_nested_field() {
    let config = ComparisonConfiguration::builder()
        .with_ignored_fields(["home.address.number"])
        .build()
        .unwrap();
    let comparator = RecursiveComparator::new(config);
    assert!(comparator
        .compare_serializable(&person("John", 42, 1), &person("John", 42, 2))
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Enums and options
// ---------------------------------------------------------------------------

#[test]
fn test_enum_variants_and_payloads() {
    let actual = Drawing {
        shapes: vec![Shape::Point, Shape::Circle { radius: 1 }, Shape::Square(2)],
        label: None,
    };
    let expected = Drawing {
        shapes: vec![Shape::Point, Shape::Circle { radius: 3 }, Shape::Square(2)],
        label: Some("sketch".to_string()),
    };

    let differences =
        compare_serializable(&actual, &expected, &ComparisonConfiguration::default()).unwrap();

    assert_eq!(paths(&differences), vec!["shapes.[1].radius", "label"]);
}

#[test]
fn test_different_variants_are_one_difference() {
    let actual = Drawing {
        shapes: vec![Shape::Square(1)],
        label: None,
    };
    let expected = Drawing {
        shapes: vec![Shape::Circle { radius: 1 }],
        label: None,
    };

    let differences =
        compare_serializable(&actual, &expected, &ComparisonConfiguration::default()).unwrap();

    assert_eq!(paths(&differences), vec!["shapes.[0]"]);
}

// ---------------------------------------------------------------------------
// Standard collections
// ---------------------------------------------------------------------------

#[test]
fn test_btree_maps_compare_by_key() {
    let actual: BTreeMap<&str, u32> = [("a", 1), ("b", 2)].into_iter().collect();
    let expected: BTreeMap<&str, u32> = [("a", 1), ("b", 3)].into_iter().collect();

    let differences =
        compare_serializable(&actual, &expected, &ComparisonConfiguration::default()).unwrap();
    assert_eq!(paths(&differences), vec!["b"]);
}

#[test]
fn test_serialized_sets_are_ordered_sequences() {
    let actual: BTreeSet<u32> = [1, 2].into_iter().collect();
    let expected = vec![1u32, 2];
    assert!(
        compare_serializable(&actual, &expected, &ComparisonConfiguration::default())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_fixed_arrays_and_vectors_differ() {
    let differences = compare_serializable(
        &[1u32, 2],
        &vec![1u32, 2],
        &ComparisonConfiguration::default(),
    )
    .unwrap();
    assert_eq!(
        differences[0].description.as_deref(),
        Some("actual field is an array but expected field is not (Vec)")
    );
}

// ---------------------------------------------------------------------------
// JSON documents
// ---------------------------------------------------------------------------

#[test]
fn test_json_documents() {
    let actual = json!({
        "name": "John",
        "tags": ["a", "b"],
        "address": {"number": 1}
    });
    let expected = json!({
        "name": "John",
        "tags": ["a", "c"],
        "address": {"number": 2}
    });

    let differences =
        compare_serializable(&actual, &expected, &ComparisonConfiguration::default()).unwrap();

    assert_eq!(paths(&differences), vec!["address.number", "tags.[1]"]);
}

#[test]
fn test_struct_against_json_map_is_a_kind_mismatch() {
    let actual = Address {
        number: 1,
        street: "Main Street".to_string(),
    };
    let expected = json!({"number": 1, "street": "Main Street"});

    let differences =
        compare_serializable(&actual, &expected, &ComparisonConfiguration::default()).unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].path(), "");
}

// ---------------------------------------------------------------------------
// Serialization failures
// ---------------------------------------------------------------------------

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("refusing to serialize"))
    }
}

#[test]
fn test_serialization_error_is_reported() {
    let err = compare_serializable(
        &Unserializable,
        &1u32,
        &ComparisonConfiguration::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Serialization);
    assert_eq!(err.op(), Some("compare_serializable"));
    assert!(err.message().contains("refusing to serialize"));
}

#[test]
fn test_assertion_surfaces_serialization_error() {
    let failure = assert_that(&1u32)
        .using_default_recursive_comparison()
        .check_equal_to(&Unserializable)
        .unwrap_err();
    assert!(matches!(failure, ComparisonFailure::Error(_)));
    assert!(failure.differences().is_empty());
}

#[test]
fn test_assertion_report_lists_differences_and_configuration() {
    let config = ComparisonConfiguration::builder()
        .with_ignored_fields(["age"])
        .build()
        .unwrap();
    let failure = assert_that(&person("John", 42, 1))
        .using_recursive_comparison(config)
        .check_equal_to(&person("Jack", 40, 1))
        .unwrap_err();

    let report = failure.to_string();
    assert!(report.contains("found the following 1 difference:"));
    assert!(report.contains("field/property 'name' differ:"));
    assert!(report.contains("- ignored fields: age"));
}
