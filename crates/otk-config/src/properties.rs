use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use otk_spi::ComponentLoader;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::DeclarativeConfigError;

/// Read-only, typed view over one node of a configuration document.
///
/// Accessors return `None` when a property is absent, explicitly null, or of
/// a different type than requested. The view also carries the loader that
/// produced it so providers can resolve nested components.
#[derive(Clone)]
pub struct DeclarativeConfigProperties {
    values: Arc<Map<String, Value>>,
    loader: Arc<dyn ComponentLoader>,
}

/// Scalar types readable through [`DeclarativeConfigProperties::get_scalar_list`].
pub trait Scalar: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl Scalar for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl Scalar for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Scalar for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl Scalar for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl DeclarativeConfigProperties {
    pub fn from_map(values: Map<String, Value>, loader: Arc<dyn ComponentLoader>) -> Self {
        Self {
            values: Arc::new(values),
            loader,
        }
    }

    pub fn empty(loader: Arc<dyn ComponentLoader>) -> Self {
        Self::from_map(Map::new(), loader)
    }

    /// View a serializable model. Fields serialized as absent stay absent.
    pub fn from_model<M: Serialize>(
        model: &M,
        loader: Arc<dyn ComponentLoader>,
    ) -> Result<Self, DeclarativeConfigError> {
        match serde_json::to_value(model) {
            Ok(Value::Object(values)) => Ok(Self::from_map(values, loader)),
            Ok(Value::Null) => Ok(Self::empty(loader)),
            Ok(other) => Err(DeclarativeConfigError::new(format!(
                "expected a structured node, found {}",
                kind_of(&other)
            ))),
            Err(err) => Err(DeclarativeConfigError::new(format!(
                "failed to read configuration node: {err}"
            ))),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        match self.values.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).and_then(String::from_value)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Integral numbers only; `1.5` is not an int.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Interpret an integer property as milliseconds.
    pub fn get_duration_millis(&self, name: &str) -> Option<Duration> {
        self.get_int(name)
            .and_then(|ms| u64::try_from(ms).ok())
            .map(Duration::from_millis)
    }

    pub fn get_string_or(&self, name: &str, default: &str) -> String {
        self.get_string(name).unwrap_or_else(|| default.to_owned())
    }

    pub fn get_int_or(&self, name: &str, default: i64) -> i64 {
        self.get_int(name).unwrap_or(default)
    }

    pub fn get_bool_or(&self, name: &str, default: bool) -> bool {
        self.get_bool(name).unwrap_or(default)
    }

    /// A list whose every element is a `T`; `None` if any element is not.
    pub fn get_scalar_list<T: Scalar>(&self, name: &str) -> Option<Vec<T>> {
        match self.get(name)? {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    pub fn get_structured(&self, name: &str) -> Option<DeclarativeConfigProperties> {
        match self.get(name)? {
            Value::Object(map) => Some(self.child(map.clone())),
            _ => None,
        }
    }

    /// A list whose every element is a structured node.
    pub fn get_structured_list(&self, name: &str) -> Option<Vec<DeclarativeConfigProperties>> {
        match self.get(name)? {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Some(self.child(map.clone())),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Keys present on this node, sorted.
    pub fn property_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn component_loader(&self) -> Arc<dyn ComponentLoader> {
        self.loader.clone()
    }

    /// Raw backing map, for providers that forward configuration verbatim.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    fn child(&self, values: Map<String, Value>) -> Self {
        Self::from_map(values, self.loader.clone())
    }
}

impl fmt::Debug for DeclarativeConfigProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarativeConfigProperties")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a structured node",
    }
}
