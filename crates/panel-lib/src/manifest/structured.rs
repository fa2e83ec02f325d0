//! Object-or-empty values such as `resources` and `securityContext`
//!
//! Some producers encode an empty object as `[]` or `null`. The API server
//! only accepts an object for these fields, so the value is decoded into an
//! explicit variant and always written back as an object.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum StructuredOrEmpty {
    Structured(Map<String, Value>),
    Empty,
}

impl StructuredOrEmpty {
    pub fn is_empty(&self) -> bool {
        matches!(self, StructuredOrEmpty::Empty)
    }

    pub fn into_value(self) -> Value {
        match self {
            StructuredOrEmpty::Structured(map) => Value::Object(map),
            StructuredOrEmpty::Empty => Value::Object(Map::new()),
        }
    }
}

impl Serialize for StructuredOrEmpty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StructuredOrEmpty::Structured(map) => map.serialize(serializer),
            StructuredOrEmpty::Empty => Map::new().serialize(serializer),
        }
    }
}

struct StructuredOrEmptyVisitor;

impl<'de> Visitor<'de> for StructuredOrEmptyVisitor {
    type Value = StructuredOrEmpty;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object, an empty list or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(StructuredOrEmpty::Empty)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(StructuredOrEmpty::Empty)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_value(
                de::Unexpected::Seq,
                &"an object or an empty list",
            ));
        }
        Ok(StructuredOrEmpty::Empty)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        let map = Map::deserialize(de::value::MapAccessDeserializer::new(map))?;
        if map.is_empty() {
            Ok(StructuredOrEmpty::Empty)
        } else {
            Ok(StructuredOrEmpty::Structured(map))
        }
    }
}

impl<'de> Deserialize<'de> for StructuredOrEmpty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StructuredOrEmptyVisitor)
    }
}
