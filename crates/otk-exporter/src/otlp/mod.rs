//! OTLP/HTTP metric exporter.

mod channel;
mod encode;
mod exporter;

pub use channel::{ExportRequest, HttpChannel, NoopTransport, Transport};
pub use exporter::{
    OtlpHttpMetricExporter, OtlpHttpMetricExporterBuilder, OtlpProtocol, TlsPaths,
    DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, JSON_CONTENT_TYPE,
};
