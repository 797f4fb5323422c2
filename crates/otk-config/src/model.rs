//! Typed models for the subset of the declarative configuration document the
//! SDK understands.

use std::borrow::Cow;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Root of a configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenTelemetryConfigurationModel {
    pub file_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_provider: Option<MeterProviderModel>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeterProviderModel {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub readers: Vec<MetricReaderModel>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricReaderModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodic: Option<PeriodicMetricReaderModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicMetricReaderModel {
    /// Export interval in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    /// Export timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    pub exporter: PushMetricExporterModel,
}

/// Exporter node: exactly one built-in variant or one plugin entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMetricExporterModel {
    Otlp(OtlpMetricModel),
    Console(ConsoleModel),
    /// Plugin exporter: the key names the provider, the value is its raw
    /// configuration.
    Named(String, Map<String, Value>),
}

impl PushMetricExporterModel {
    pub const OTLP: &'static str = "otlp";
    pub const CONSOLE: &'static str = "console";

    /// Plugin node. A built-in key stays `Named` here; see [`Self::canonical`].
    pub fn named(name: impl Into<String>, config: Map<String, Value>) -> Self {
        PushMetricExporterModel::Named(name.into(), config)
    }

    /// The node as a document would read it back: a `Named` node whose key
    /// is `otlp` or `console` becomes the built-in variant.
    pub fn canonical(&self) -> Result<Cow<'_, Self>, serde_json::Error> {
        match self {
            PushMetricExporterModel::Named(name, config)
                if name == Self::OTLP || name == Self::CONSOLE =>
            {
                let mut node = Map::new();
                node.insert(name.clone(), Value::Object(config.clone()));
                serde_json::from_value(Value::Object(node)).map(Cow::Owned)
            }
            _ => Ok(Cow::Borrowed(self)),
        }
    }

    /// Key this node is written under in a document.
    pub fn key(&self) -> &str {
        match self {
            PushMetricExporterModel::Otlp(_) => Self::OTLP,
            PushMetricExporterModel::Console(_) => Self::CONSOLE,
            PushMetricExporterModel::Named(name, _) => name,
        }
    }
}

impl Serialize for PushMetricExporterModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            PushMetricExporterModel::Otlp(model) => map.serialize_entry(Self::OTLP, model)?,
            PushMetricExporterModel::Console(model) => map.serialize_entry(Self::CONSOLE, model)?,
            PushMetricExporterModel::Named(name, config) => map.serialize_entry(name, config)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PushMetricExporterModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Map::<String, Value>::deserialize(deserializer)?;
        if entries.len() != 1 {
            return Err(D::Error::custom(format!(
                "exporter must have exactly one entry, found {}",
                entries.len()
            )));
        }
        let Some((key, value)) = entries.into_iter().next() else {
            return Err(D::Error::custom("exporter must have exactly one entry"));
        };
        // `console:` with no body arrives as null
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        match key.as_str() {
            Self::OTLP => serde_json::from_value(value)
                .map(PushMetricExporterModel::Otlp)
                .map_err(|err| D::Error::custom(format!("otlp: {err}"))),
            Self::CONSOLE => serde_json::from_value(value)
                .map(PushMetricExporterModel::Console)
                .map_err(|err| D::Error::custom(format!("console: {err}"))),
            _ => match value {
                Value::Object(config) => Ok(PushMetricExporterModel::Named(key, config)),
                _ => Err(D::Error::custom(format!(
                    "exporter \"{key}\" must be a structured node"
                ))),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsoleModel {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameStringValuePairModel {
    pub name: String,
    pub value: String,
}

impl NameStringValuePairModel {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultHistogramAggregation {
    #[serde(rename = "explicit_bucket_histogram")]
    ExplicitBucketHistogram,
    #[serde(rename = "base2_exponential_bucket_histogram")]
    Base2ExponentialBucketHistogram,
}

impl DefaultHistogramAggregation {
    /// Wire-format name as written in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            DefaultHistogramAggregation::ExplicitBucketHistogram => "explicit_bucket_histogram",
            DefaultHistogramAggregation::Base2ExponentialBucketHistogram => {
                "base2_exponential_bucket_histogram"
            }
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "explicit_bucket_histogram" => Some(Self::ExplicitBucketHistogram),
            "base2_exponential_bucket_histogram" => Some(Self::Base2ExponentialBucketHistogram),
            _ => None,
        }
    }
}

/// Built-in OTLP metric exporter settings. Absent fields fall back to the
/// exporter's defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OtlpMetricModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<NameStringValuePairModel>>,
    /// Comma-separated `key=value` pairs, applied after `headers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers_list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporality_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_histogram_aggregation: Option<DefaultHistogramAggregation>,
}

impl OtlpMetricModel {
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_headers(mut self, headers: Vec<NameStringValuePairModel>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_headers_list(mut self, headers_list: impl Into<String>) -> Self {
        self.headers_list = Some(headers_list.into());
        self
    }

    pub fn with_compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: i64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    pub fn with_certificate(mut self, path: impl Into<String>) -> Self {
        self.certificate = Some(path.into());
        self
    }

    pub fn with_client_key(mut self, path: impl Into<String>) -> Self {
        self.client_key = Some(path.into());
        self
    }

    pub fn with_client_certificate(mut self, path: impl Into<String>) -> Self {
        self.client_certificate = Some(path.into());
        self
    }

    pub fn with_temporality_preference(mut self, preference: impl Into<String>) -> Self {
        self.temporality_preference = Some(preference.into());
        self
    }

    pub fn with_default_histogram_aggregation(
        mut self,
        aggregation: DefaultHistogramAggregation,
    ) -> Self {
        self.default_histogram_aggregation = Some(aggregation);
        self
    }
}
