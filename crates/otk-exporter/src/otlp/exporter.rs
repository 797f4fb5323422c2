use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use otk_compress::Compressor;
use otk_config::{CloseError, Closeable};

use super::channel::{ExportRequest, HttpChannel};
use super::encode;
use crate::aggregation::{
    Aggregation, AggregationTemporality, AggregationTemporalitySelector,
    DefaultAggregationSelector,
};
use crate::data::{InstrumentType, MetricData};
use crate::exporter::{ExportError, MetricExporter};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4318/v1/metrics";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtlpProtocol {
    #[default]
    HttpProtobuf,
    HttpJson,
}

impl OtlpProtocol {
    pub fn as_str(self) -> &'static str {
        match self {
            OtlpProtocol::HttpProtobuf => "http/protobuf",
            OtlpProtocol::HttpJson => "http/json",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "http/protobuf" => Some(OtlpProtocol::HttpProtobuf),
            "http/json" => Some(OtlpProtocol::HttpJson),
            _ => None,
        }
    }
}

/// Client TLS material, kept as paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsPaths {
    pub certificate: Option<String>,
    pub client_key: Option<String>,
    pub client_certificate: Option<String>,
}

pub struct OtlpHttpMetricExporterBuilder {
    endpoint: String,
    protocol: OtlpProtocol,
    headers: Vec<(String, String)>,
    compressor: Option<Arc<dyn Compressor>>,
    timeout: Duration,
    tls: TlsPaths,
    temporality: AggregationTemporalitySelector,
    aggregation: DefaultAggregationSelector,
    channel: Option<Arc<HttpChannel>>,
}

impl Default for OtlpHttpMetricExporterBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            protocol: OtlpProtocol::default(),
            headers: Vec::new(),
            compressor: None,
            timeout: DEFAULT_TIMEOUT,
            tls: TlsPaths::default(),
            temporality: AggregationTemporalitySelector::always_cumulative(),
            aggregation: DefaultAggregationSelector::new(),
            channel: None,
        }
    }
}

impl OtlpHttpMetricExporterBuilder {
    pub fn set_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn set_protocol(mut self, protocol: OtlpProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Later values for the same key are sent alongside earlier ones.
    pub fn add_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn set_compressor(mut self, compressor: Option<Arc<dyn Compressor>>) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_trusted_certificates(mut self, path: impl Into<String>) -> Self {
        self.tls.certificate = Some(path.into());
        self
    }

    pub fn set_client_tls(
        mut self,
        client_key: impl Into<String>,
        client_certificate: impl Into<String>,
    ) -> Self {
        self.tls.client_key = Some(client_key.into());
        self.tls.client_certificate = Some(client_certificate.into());
        self
    }

    pub fn set_aggregation_temporality_selector(
        mut self,
        selector: AggregationTemporalitySelector,
    ) -> Self {
        self.temporality = selector;
        self
    }

    pub fn set_default_aggregation_selector(mut self, selector: DefaultAggregationSelector) -> Self {
        self.aggregation = selector;
        self
    }

    pub fn set_channel(mut self, channel: Arc<HttpChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn build(self) -> OtlpHttpMetricExporter {
        OtlpHttpMetricExporter {
            endpoint: self.endpoint,
            protocol: self.protocol,
            headers: self.headers,
            compressor: self.compressor,
            timeout: self.timeout,
            tls: self.tls,
            temporality: self.temporality,
            aggregation: self.aggregation,
            channel: self.channel.unwrap_or_default(),
            shutdown: AtomicBool::new(false),
        }
    }
}

/// OTLP over HTTP metric exporter for number points. Request bodies are
/// OTLP/JSON whatever the configured protocol; the protocol is passed
/// through to the transport.
pub struct OtlpHttpMetricExporter {
    endpoint: String,
    protocol: OtlpProtocol,
    headers: Vec<(String, String)>,
    compressor: Option<Arc<dyn Compressor>>,
    timeout: Duration,
    tls: TlsPaths,
    temporality: AggregationTemporalitySelector,
    aggregation: DefaultAggregationSelector,
    channel: Arc<HttpChannel>,
    shutdown: AtomicBool,
}

impl OtlpHttpMetricExporter {
    pub fn builder() -> OtlpHttpMetricExporterBuilder {
        OtlpHttpMetricExporterBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn protocol(&self) -> OtlpProtocol {
        self.protocol
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Content encoding of request bodies, if compressed.
    pub fn compression(&self) -> Option<&str> {
        self.compressor.as_ref().map(|c| c.encoding())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn tls(&self) -> &TlsPaths {
        &self.tls
    }

    pub fn channel(&self) -> &Arc<HttpChannel> {
        &self.channel
    }

    fn encode(&self, metrics: &[MetricData]) -> Result<Bytes, ExportError> {
        let request = encode::metrics_request(metrics, self.temporality)?;
        let body = Bytes::from(serde_json::to_vec(&request)?);
        match &self.compressor {
            Some(compressor) => Ok(compressor.compress(&body)?),
            None => Ok(body),
        }
    }
}

impl MetricExporter for OtlpHttpMetricExporter {
    fn export(&self, metrics: &[MetricData]) -> Result<(), ExportError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(ExportError::Shutdown);
        }
        let body = self.encode(metrics)?;
        tracing::debug!(
            endpoint = %self.endpoint,
            protocol = self.protocol.as_str(),
            metrics = metrics.len(),
            bytes = body.len(),
            "exporting metrics"
        );
        self.channel.send(ExportRequest {
            endpoint: self.endpoint.clone(),
            headers: self.headers.clone(),
            content_type: JSON_CONTENT_TYPE,
            content_encoding: self.compression().map(str::to_string),
            timeout: self.timeout,
            body,
        })
    }

    fn shutdown(&self) -> Result<(), ExportError> {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            tracing::debug!("otlp metric exporter already shut down");
            return Ok(());
        }
        self.channel
            .close()
            .map_err(|err| ExportError::Transport(err.to_string()))
    }

    fn aggregation_temporality(&self, instrument: InstrumentType) -> AggregationTemporality {
        self.temporality.select(instrument)
    }

    fn default_aggregation(&self, instrument: InstrumentType) -> Aggregation {
        self.aggregation.get(instrument)
    }
}

impl Closeable for OtlpHttpMetricExporter {
    fn close(&self) -> Result<(), CloseError> {
        self.shutdown()
            .map_err(|err| CloseError::new("OtlpHttpMetricExporter", err.to_string()))
    }
}

impl fmt::Debug for OtlpHttpMetricExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtlpHttpMetricExporter")
            .field("endpoint", &self.endpoint)
            .field("protocol", &self.protocol.as_str())
            .field("content_type", &JSON_CONTENT_TYPE)
            .field("compression", &self.compression().unwrap_or(otk_compress::NONE))
            .field("timeout", &self.timeout)
            .field("temporality", &self.temporality)
            .finish()
    }
}
