use std::fmt;
use std::hash::{Hash, Hasher};

use crate::AnyValueBytes;

/// Closed set of value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyValueType {
    String,
    Bool,
    Long,
    Double,
    Array,
    KeyValueList,
    Bytes,
}

impl AnyValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnyValueType::String => "string",
            AnyValueType::Bool => "bool",
            AnyValueType::Long => "long",
            AnyValueType::Double => "double",
            AnyValueType::Array => "array",
            AnyValueType::KeyValueList => "key_value_list",
            AnyValueType::Bytes => "bytes",
        }
    }
}

/// A value that may be nested arbitrarily deep.
#[derive(Debug, Clone)]
pub enum AnyValue {
    String(String),
    Bool(bool),
    Long(i64),
    Double(f64),
    Array(Vec<AnyValue>),
    KeyValueList(Vec<KeyAnyValue>),
    Bytes(AnyValueBytes),
}

/// One entry of a [`AnyValue::KeyValueList`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyAnyValue {
    pub key: String,
    pub value: AnyValue,
}

impl KeyAnyValue {
    pub fn new(key: impl Into<String>, value: impl Into<AnyValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl AnyValue {
    pub fn string(value: impl Into<String>) -> Self {
        AnyValue::String(value.into())
    }

    pub fn bool(value: bool) -> Self {
        AnyValue::Bool(value)
    }

    pub fn long(value: i64) -> Self {
        AnyValue::Long(value)
    }

    pub fn double(value: f64) -> Self {
        AnyValue::Double(value)
    }

    pub fn bytes(value: &[u8]) -> Self {
        AnyValue::Bytes(AnyValueBytes::new(value))
    }

    pub fn array(values: impl IntoIterator<Item = AnyValue>) -> Self {
        AnyValue::Array(values.into_iter().collect())
    }

    pub fn key_value_list(entries: impl IntoIterator<Item = KeyAnyValue>) -> Self {
        AnyValue::KeyValueList(entries.into_iter().collect())
    }

    pub fn value_type(&self) -> AnyValueType {
        match self {
            AnyValue::String(_) => AnyValueType::String,
            AnyValue::Bool(_) => AnyValueType::Bool,
            AnyValue::Long(_) => AnyValueType::Long,
            AnyValue::Double(_) => AnyValueType::Double,
            AnyValue::Array(_) => AnyValueType::Array,
            AnyValue::KeyValueList(_) => AnyValueType::KeyValueList,
            AnyValue::Bytes(_) => AnyValueType::Bytes,
        }
    }

    /// Canonical string rendering, used when a sink only understands text.
    pub fn as_string(&self) -> String {
        match self {
            AnyValue::String(s) => s.clone(),
            AnyValue::Bool(b) => b.to_string(),
            AnyValue::Long(l) => l.to_string(),
            AnyValue::Double(d) => d.to_string(),
            AnyValue::Array(values) => {
                let parts: Vec<String> = values.iter().map(AnyValue::as_string).collect();
                format!("[{}]", parts.join(", "))
            }
            AnyValue::KeyValueList(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|kv| format!("{}={}", kv.key, kv.value.as_string()))
                    .collect();
                format!("[{}]", parts.join(", "))
            }
            AnyValue::Bytes(b) => b.as_string(),
        }
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnyValue::String(a), AnyValue::String(b)) => a == b,
            (AnyValue::Bool(a), AnyValue::Bool(b)) => a == b,
            (AnyValue::Long(a), AnyValue::Long(b)) => a == b,
            // bitwise so that Eq and Hash stay lawful for NaN
            (AnyValue::Double(a), AnyValue::Double(b)) => a.to_bits() == b.to_bits(),
            (AnyValue::Array(a), AnyValue::Array(b)) => a == b,
            (AnyValue::KeyValueList(a), AnyValue::KeyValueList(b)) => a == b,
            (AnyValue::Bytes(a), AnyValue::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AnyValue {}

impl Hash for AnyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value_type().hash(state);
        match self {
            AnyValue::String(s) => s.hash(state),
            AnyValue::Bool(b) => b.hash(state),
            AnyValue::Long(l) => l.hash(state),
            AnyValue::Double(d) => d.to_bits().hash(state),
            AnyValue::Array(values) => values.hash(state),
            AnyValue::KeyValueList(entries) => entries.hash(state),
            AnyValue::Bytes(b) => b.hash(state),
        }
    }
}

impl fmt::Display for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for AnyValue {
    fn from(value: &str) -> Self {
        AnyValue::String(value.to_owned())
    }
}

impl From<String> for AnyValue {
    fn from(value: String) -> Self {
        AnyValue::String(value)
    }
}

impl From<bool> for AnyValue {
    fn from(value: bool) -> Self {
        AnyValue::Bool(value)
    }
}

impl From<i64> for AnyValue {
    fn from(value: i64) -> Self {
        AnyValue::Long(value)
    }
}

impl From<f64> for AnyValue {
    fn from(value: f64) -> Self {
        AnyValue::Double(value)
    }
}

impl From<AnyValueBytes> for AnyValue {
    fn from(value: AnyValueBytes) -> Self {
        AnyValue::Bytes(value)
    }
}
