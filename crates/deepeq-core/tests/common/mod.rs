//! Shared fixtures for deepeq-core integration tests.

#![allow(dead_code)]

use deepeq_core::value::{Object, ObjectKind, Value};
use deepeq_core::ComparisonDifference;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub number: u32,
    pub street: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Home {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub home: Home,
}

pub fn person(name: &str, age: u32, number: u32) -> Person {
    Person {
        name: name.to_string(),
        age,
        home: Home {
            address: Address {
                number,
                street: "Main Street".to_string(),
            },
        },
    }
}

/// `Person { name }` object built directly as a graph
pub fn named(type_name: &str, name: &str) -> Value {
    Object::new(type_name).with_member("name", name).into_value()
}

/// Report paths of the differences, in order
pub fn paths(differences: &[ComparisonDifference]) -> Vec<String> {
    differences.iter().map(ComparisonDifference::path).collect()
}

/// Structural copy of an acyclic graph sharing no allocation with the source
pub fn deep_copy(value: &Value) -> Value {
    match value {
        Value::Array(seq) => Value::array(seq.iter().map(deep_copy)),
        Value::List(seq) => Value::list(seq.iter().map(deep_copy)),
        Value::Set(seq) => Value::set(seq.iter().map(deep_copy)),
        Value::Map(map) => Value::map(
            map.entries()
                .iter()
                .map(|(k, v)| (deep_copy(k), deep_copy(v))),
        ),
        Value::Object(object_ref) => {
            let source = object_ref.borrow();
            assert_eq!(source.kind(), ObjectKind::Struct, "variants are not copied");
            let mut copy = Object::new(source.type_name());
            for member in source.members() {
                copy = if member.transient {
                    copy.with_transient_member(member.name.clone(), deep_copy(&member.value))
                } else {
                    copy.with_member(member.name.clone(), deep_copy(&member.value))
                };
            }
            copy.into_value()
        }
        scalar => scalar.clone(),
    }
}
