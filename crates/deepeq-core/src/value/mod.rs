//! Dynamic value graph compared by the recursive comparator.
//!
//! Containers and objects are reference counted so that identity is
//! observable: two `Value`s pointing at the same allocation are the same
//! node, which is what the identity shortcut and the cycle guard rely on.
//! Objects are additionally interior-mutable so self-referential graphs
//! (`a.neighbour = a`) can be built after the fact.

mod display;
pub mod ser;

use std::cell::{Ref, RefCell};
use std::rc::Rc;

pub use ser::to_value;

/// A node of a comparable object graph
#[derive(Clone)]
pub enum Value {
    Null,
    Unit,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Char(char),
    Str(String),
    Bytes(Vec<u8>),
    Enum(EnumValue),
    /// Fixed-size array or tuple
    Array(Seq),
    /// Ordered, growable sequence
    List(Seq),
    /// Unordered collection
    Set(Seq),
    Map(MapRef),
    Object(ObjectRef),
}

/// A unit enum variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: String,
    pub variant: String,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            variant: variant.into(),
        }
    }
}

/// Shared sequence of values (array, list or set contents)
#[derive(Clone)]
pub struct Seq(Rc<Vec<Value>>);

impl Seq {
    pub fn new(values: Vec<Value>) -> Self {
        Self(Rc::new(values))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

/// Shared keyed collection, entries kept in insertion order
#[derive(Clone)]
pub struct MapRef(Rc<Vec<(Value, Value)>>);

impl MapRef {
    pub fn new(entries: Vec<(Value, Value)>) -> Self {
        Self(Rc::new(entries))
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

/// A named member of an object
#[derive(Clone)]
pub struct Member {
    pub name: String,
    pub value: Value,
    /// Marks non-persistent members (skipped with `ignore_transient_members`)
    pub transient: bool,
}

/// Whether an object models a plain struct or a data-carrying enum variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Struct,
    Variant,
}

/// A user type with named members
#[derive(Clone)]
pub struct Object {
    type_name: String,
    kind: ObjectKind,
    members: Vec<Member>,
}

impl Object {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: ObjectKind::Struct,
            members: Vec::new(),
        }
    }

    /// A data-carrying enum variant, named `Enum::Variant`
    pub fn variant(enum_name: &str, variant: &str) -> Self {
        Self {
            type_name: format!("{}::{}", enum_name, variant),
            kind: ObjectKind::Variant,
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_member(name, value);
        self
    }

    pub fn with_transient_member(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let name = name.into();
        self.set_member(name.clone(), value);
        if let Some(member) = self.members.iter_mut().find(|m| m.name == name) {
            member.transient = true;
        }
        self
    }

    /// Replace the member named `name`, or append it if absent
    pub fn set_member(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.members.iter_mut().find(|m| m.name == name) {
            Some(member) => member.value = value,
            None => self.members.push(Member {
                name,
                value,
                transient: false,
            }),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.into_ref())
    }
}

/// Shared, interior-mutable handle to an object
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    pub fn new(object: Object) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    /// Borrow the object
    ///
    /// # Panics
    ///
    /// Panics if the object is currently being mutated through `set_member`.
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    /// Set a member after construction, typically to close a cycle
    pub fn set_member(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.borrow_mut().set_member(name, value);
    }

    pub fn type_name(&self) -> String {
        self.0.borrow().type_name.clone()
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Value {
    pub fn list(values: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Seq::new(values.into_iter().collect()))
    }

    pub fn array(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Seq::new(values.into_iter().collect()))
    }

    pub fn set(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(Seq::new(values.into_iter().collect()))
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(MapRef::new(entries.into_iter().collect()))
    }

    pub fn enumeration(type_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Value::Enum(EnumValue::new(type_name, variant))
    }

    /// Runtime type description used for strict typing, type overrides and messages
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Unit => "()".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::I64(_) => "i64".to_string(),
            Value::U64(_) => "u64".to_string(),
            Value::F64(_) => "f64".to_string(),
            Value::Char(_) => "char".to_string(),
            Value::Str(_) => "String".to_string(),
            Value::Bytes(_) => "bytes".to_string(),
            Value::Enum(e) => e.type_name.clone(),
            Value::Array(_) => "array".to_string(),
            Value::List(_) => "Vec".to_string(),
            Value::Set(_) => "Set".to_string(),
            Value::Map(_) => "Map".to_string(),
            Value::Object(o) => o.type_name(),
        }
    }

    /// Address of the shared allocation, for containers and objects
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(s) | Value::List(s) | Value::Set(s) => Some(s.identity()),
            Value::Map(m) => Some(m.identity()),
            Value::Object(o) => Some(o.identity()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Standard scalar compared with natural equality
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Value::Unit
                | Value::Bool(_)
                | Value::I64(_)
                | Value::U64(_)
                | Value::F64(_)
                | Value::Char(_)
                | Value::Str(_)
                | Value::Bytes(_)
        )
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Value::Enum(_))
    }

    /// True for empty arrays, lists, sets and maps
    pub fn is_empty_container(&self) -> bool {
        match self {
            Value::Array(s) | Value::List(s) | Value::Set(s) => s.is_empty(),
            Value::Map(m) => m.is_empty(),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Natural equality of two leaf values; `None` when either side is not a leaf
    ///
    /// Different scalar kinds are never equal (`I64(1)` vs `U64(1)`); NaN
    /// equals NaN so that a value always equals a copy of itself.
    pub fn leaf_eq(&self, other: &Value) -> Option<bool> {
        let equal = match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ if self.is_leaf() && other.is_leaf() => false,
            _ => return None,
        };
        Some(equal)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::I64(v as i64)
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::U64(v as u64)
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F64(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        v.into_value()
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v.into_iter().map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let list = Value::list(vec![Value::from(1)]);
        let clone = list.clone();
        assert_eq!(list.identity(), clone.identity());

        let other = Value::list(vec![Value::from(1)]);
        assert_ne!(list.identity(), other.identity());
    }

    #[test]
    fn test_scalars_have_no_identity() {
        assert!(Value::from("a").identity().is_none());
        assert!(Value::Null.identity().is_none());
    }

    #[test]
    fn test_set_member_replaces_existing() {
        let person = Object::new("Person")
            .with_member("name", "John")
            .with_member("name", "Jack");
        assert_eq!(person.members().len(), 1);
        assert_eq!(
            person.member("name").and_then(|m| m.value.as_str()),
            Some("Jack")
        );
    }

    #[test]
    fn test_object_ref_can_close_a_cycle() {
        let person = Object::new("Person").with_member("name", "John").into_ref();
        person.set_member("neighbour", person.clone());

        let borrowed = person.borrow();
        let neighbour = borrowed
            .member("neighbour")
            .and_then(|m| m.value.as_object())
            .unwrap();
        assert!(neighbour.ptr_eq(&person));
    }

    #[test]
    fn test_transient_member_flag() {
        let obj = Object::new("Session").with_transient_member("cache", 1);
        assert!(obj.member("cache").unwrap().transient);
    }

    #[test]
    fn test_leaf_eq() {
        assert_eq!(Value::from(1).leaf_eq(&Value::from(1)), Some(true));
        assert_eq!(Value::from(1i64).leaf_eq(&Value::from(1u64)), Some(false));
        assert_eq!(Value::F64(f64::NAN).leaf_eq(&Value::F64(f64::NAN)), Some(true));
        assert_eq!(Value::from(1).leaf_eq(&Value::list(vec![])), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from("x").type_name(), "String");
        assert_eq!(Value::list(vec![]).type_name(), "Vec");
        assert_eq!(Value::array(vec![]).type_name(), "array");
        assert_eq!(Object::new("Person").into_value().type_name(), "Person");
        assert_eq!(Value::enumeration("Color", "Red").type_name(), "Color");
    }
}
