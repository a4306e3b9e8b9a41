//! # Value Model
//!
//! A closed tagged variant representing a JSON-like value. Schemas and
//! instances share this representation: a schema node is simply a [`Value`]
//! that is expected to be an object (or, for a few keywords, a boolean).
//!
//! ## Numbers
//!
//! All numbers are stored as `f64`. There is no integer variant and no
//! implicit integer promotion: `1` and `1.0` are the same value.
//!
//! ## Objects
//!
//! Objects are [`Map`]s (an `IndexMap`), so keys are unique and insertion
//! order is preserved. Key order is significant for iteration (error
//! reporting walks properties in document order) but never for equality.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// Object representation: string keys, insertion order preserved.
pub type Map = IndexMap<String, Value>;

/// A parsed JSON-like value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Any number, held as its raw IEEE value.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered sequence.
    Array(Vec<Value>),
    /// A key/value mapping with unique keys.
    Object(Map),
}

/// The runtime kind of a [`Value`].
///
/// Names match the JSON Schema primitive type names, except that there is
/// no `integer` kind: integers are numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// The JSON Schema type name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Returns the runtime kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` if this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::equal::equal(self, other)
    }
}

impl fmt::Display for Value {
    /// Renders compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::from(self.clone()))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            // Without `arbitrary_precision` every serde_json number has an f64 form.
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serde_json::Value::Number(serde_json::Number::from(n as i64))
                } else {
                    // Non-finite numbers have no JSON form.
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = ConversionError;

    /// Convert a YAML tree into a [`Value`].
    ///
    /// Schemas and instances written in YAML use only the JSON-compatible
    /// subset. Scalar map keys are stringified and tags are dropped.
    fn try_from(yaml: serde_yaml::Value) -> Result<Self, Self::Error> {
        match yaml {
            serde_yaml::Value::Null => Ok(Value::Null),
            serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_yaml::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .ok_or_else(|| ConversionError::UnsupportedNumber(n.to_string())),
            serde_yaml::Value::String(s) => Ok(Value::String(s)),
            serde_yaml::Value::Sequence(seq) => Ok(Value::Array(
                seq.into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            )),
            serde_yaml::Value::Mapping(mapping) => {
                let mut map = Map::with_capacity(mapping.len());
                for (k, v) in mapping {
                    let key = match k {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        other => return Err(ConversionError::UnsupportedKey(format!("{other:?}"))),
                    };
                    map.insert(key, Value::try_from(v)?);
                }
                Ok(Value::Object(map))
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_names_match_schema_type_names() {
        assert_eq!(Value::Null.kind().as_str(), "null");
        assert_eq!(Value::Bool(true).kind().as_str(), "boolean");
        assert_eq!(Value::Number(1.5).kind().as_str(), "number");
        assert_eq!(Value::from("x").kind().as_str(), "string");
        assert_eq!(Value::Array(vec![]).kind().as_str(), "array");
        assert_eq!(Value::Object(Map::new()).kind().as_str(), "object");
    }

    #[test]
    fn object_lookup_by_key() {
        let value = Value::from(json!({"b": 1, "a": {"c": "d"}}));
        assert_eq!(value.get("b").and_then(Value::as_f64), Some(1.0));
        assert_eq!(value.get("a").and_then(|a| a.get("c")), Some(&Value::from("d")));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::Null.get("a"), None);
    }

    #[test]
    fn yaml_objects_keep_document_order() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("b: 1\na: 2\nc: 3\n").unwrap();
        let value = Value::try_from(yaml).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn integers_become_plain_numbers() {
        let value = Value::from(json!(5));
        assert_eq!(value.as_f64(), Some(5.0));
        assert_eq!(Value::from(json!(5)), Value::from(json!(5.0)));
    }

    #[test]
    fn display_renders_compact_json() {
        let value = Value::from(json!({"a": [1, 2.5, null, true, "s"]}));
        assert_eq!(value.to_string(), r#"{"a":[1,2.5,null,true,"s"]}"#);
    }

    #[test]
    fn non_finite_numbers_serialize_as_null() {
        let json: serde_json::Value = Value::Number(f64::INFINITY).into();
        assert_eq!(json, serde_json::Value::Null);
    }

    #[test]
    fn serde_round_trips_through_json_text() {
        let value: Value = serde_json::from_str(r#"{"type": ["string", "null"]}"#).unwrap();
        assert_eq!(value.get("type").and_then(Value::as_array).map(<[_]>::len), Some(2));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"type":["string","null"]}"#);
    }

    #[test]
    fn yaml_to_value_conversion() {
        let yaml_str = r#"
id: http://example.com/schema
type: object
minProperties: 2
additionalProperties: false
required:
  - one
  - two
"#;
        let yaml: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let value = Value::try_from(yaml).unwrap();

        assert_eq!(value.get("id").and_then(Value::as_str), Some("http://example.com/schema"));
        assert_eq!(value.get("minProperties").and_then(Value::as_f64), Some(2.0));
        assert_eq!(value.get("additionalProperties").and_then(Value::as_bool), Some(false));
        assert_eq!(value.get("required").and_then(Value::as_array).map(<[_]>::len), Some(2));
    }

    #[test]
    fn yaml_scalar_keys_are_stringified() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: a\ntrue: b\n").unwrap();
        let value = Value::try_from(yaml).unwrap();
        assert_eq!(value.get("1").and_then(Value::as_str), Some("a"));
        assert_eq!(value.get("true").and_then(Value::as_str), Some("b"));
    }

    #[test]
    fn yaml_sequence_keys_are_rejected() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("? [a, b]\n: c\n").unwrap();
        let err = Value::try_from(yaml).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedKey(_)));
    }
}
