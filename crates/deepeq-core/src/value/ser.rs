//! Lowering of `serde::Serialize` types into a comparable value graph.
//!
//! Struct names reported by serde become object type names, which is what
//! strict type checking and per-type overrides key on. Sequences become
//! `List`s while tuples and fixed-size arrays become `Array`s.

use super::{EnumValue, Object, Value};
use crate::errors::ExError;
use serde::ser::{self, Serialize};

/// Lower any serializable value into a [`Value`] graph
///
/// # Errors
///
/// - `Serialization` - the value's `Serialize` impl failed, or it uses a
///   data type the graph cannot represent (128-bit integers)
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, ExError> {
    value.serialize(ValueSerializer)
}

/// Serializer producing [`Value`]s
pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = ExError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeObject;
    type SerializeTupleVariant = SerializeObject;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeObject;
    type SerializeStructVariant = SerializeObject;

    fn serialize_bool(self, v: bool) -> Result<Value, ExError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, ExError> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, ExError> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, ExError> {
        Ok(Value::I64(v as i64))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, ExError> {
        Ok(Value::I64(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, ExError> {
        Ok(Value::U64(v as u64))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, ExError> {
        Ok(Value::U64(v as u64))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, ExError> {
        Ok(Value::U64(v as u64))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, ExError> {
        Ok(Value::U64(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, ExError> {
        Ok(Value::F64(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, ExError> {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, ExError> {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value, ExError> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, ExError> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value, ExError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, ExError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, ExError> {
        Ok(Value::Unit)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value, ExError> {
        Ok(Object::new(name).into_value())
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, ExError> {
        Ok(Value::Enum(EnumValue::new(name, variant)))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value, ExError> {
        Ok(Object::new(name).with_member("0", to_value(value)?).into_value())
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, ExError> {
        Ok(Object::variant(name, variant)
            .with_member("0", to_value(value)?)
            .into_value())
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec, ExError> {
        Ok(SerializeVec {
            values: Vec::with_capacity(len.unwrap_or(0)),
            fixed_size: false,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec, ExError> {
        Ok(SerializeVec {
            values: Vec::with_capacity(len),
            fixed_size: true,
        })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<SerializeObject, ExError> {
        Ok(SerializeObject::new(Object::new(name)))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeObject, ExError> {
        Ok(SerializeObject::new(Object::variant(name, variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap, ExError> {
        Ok(SerializeMap {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<SerializeObject, ExError> {
        Ok(SerializeObject::new(Object::new(name)))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeObject, ExError> {
        Ok(SerializeObject::new(Object::variant(name, variant)))
    }
}

pub struct SerializeVec {
    values: Vec<Value>,
    fixed_size: bool,
}

impl SerializeVec {
    fn finish(self) -> Value {
        if self.fixed_size {
            Value::array(self.values)
        } else {
            Value::list(self.values)
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = ExError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ExError> {
        self.values.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, ExError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = ExError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ExError> {
        self.values.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, ExError> {
        Ok(self.finish())
    }
}

/// Collects struct, tuple-struct and variant members; positional members are named `0`, `1`, ...
pub struct SerializeObject {
    object: Object,
    next_index: usize,
}

impl SerializeObject {
    fn new(object: Object) -> Self {
        Self {
            object,
            next_index: 0,
        }
    }

    fn push_positional<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ExError> {
        let value = to_value(value)?;
        self.object.set_member(self.next_index.to_string(), value);
        self.next_index += 1;
        Ok(())
    }

    fn push_named<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), ExError> {
        let value = to_value(value)?;
        self.object.set_member(key, value);
        Ok(())
    }
}

impl ser::SerializeTupleStruct for SerializeObject {
    type Ok = Value;
    type Error = ExError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ExError> {
        self.push_positional(value)
    }

    fn end(self) -> Result<Value, ExError> {
        Ok(self.object.into_value())
    }
}

impl ser::SerializeTupleVariant for SerializeObject {
    type Ok = Value;
    type Error = ExError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ExError> {
        self.push_positional(value)
    }

    fn end(self) -> Result<Value, ExError> {
        Ok(self.object.into_value())
    }
}

impl ser::SerializeStruct for SerializeObject {
    type Ok = Value;
    type Error = ExError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), ExError> {
        self.push_named(key, value)
    }

    fn end(self) -> Result<Value, ExError> {
        Ok(self.object.into_value())
    }
}

impl ser::SerializeStructVariant for SerializeObject {
    type Ok = Value;
    type Error = ExError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), ExError> {
        self.push_named(key, value)
    }

    fn end(self) -> Result<Value, ExError> {
        Ok(self.object.into_value())
    }
}

pub struct SerializeMap {
    entries: Vec<(Value, Value)>,
    next_key: Option<Value>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = ExError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), ExError> {
        self.next_key = Some(to_value(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ExError> {
        let key = self.next_key.take().ok_or_else(|| {
            <ExError as ser::Error>::custom("serialize_value called before serialize_key")
        })?;
        self.entries.push((key, to_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<Value, ExError> {
        Ok(Value::map(self.entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectKind;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: u32,
        nickname: Option<String>,
    }

    #[derive(Serialize)]
    enum Shape {
        Point,
        Circle { radius: f64 },
        Pair(i32, i32),
    }

    #[test]
    fn test_struct_becomes_named_object() {
        let value = to_value(&Person {
            name: "John".to_string(),
            age: 42,
            nickname: None,
        })
        .unwrap();

        let obj = value.as_object().unwrap().borrow();
        assert_eq!(obj.type_name(), "Person");
        let names: Vec<_> = obj.members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age", "nickname"]);
        assert!(obj.member("nickname").unwrap().value.is_null());
    }

    #[test]
    fn test_vec_is_list_and_fixed_array_is_array() {
        assert!(matches!(to_value(&vec![1, 2]).unwrap(), Value::List(_)));
        assert!(matches!(to_value(&[1, 2]).unwrap(), Value::Array(_)));
        assert!(matches!(to_value(&(1, "a")).unwrap(), Value::Array(_)));
    }

    #[test]
    fn test_enum_variants() {
        assert!(matches!(to_value(&Shape::Point).unwrap(), Value::Enum(_)));

        let circle = to_value(&Shape::Circle { radius: 1.0 }).unwrap();
        let obj = circle.as_object().unwrap().borrow();
        assert_eq!(obj.type_name(), "Shape::Circle");
        assert_eq!(obj.kind(), ObjectKind::Variant);

        let pair = to_value(&Shape::Pair(1, 2)).unwrap();
        let pair = pair.as_object().unwrap().borrow();
        assert!(pair.member("0").is_some());
        assert!(pair.member("1").is_some());
    }

    #[test]
    fn test_map_keeps_entries() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        let value = to_value(&map).unwrap();
        match value {
            Value::Map(m) => assert_eq!(m.len(), 2),
            other => panic!("expected map, got {}", other),
        }
    }
}
