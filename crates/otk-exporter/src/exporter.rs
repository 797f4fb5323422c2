use std::any::Any;
use std::fmt::Debug;

use otk_compress::CompressionError;
use otk_config::Closeable;
use thiserror::Error;

use crate::aggregation::{Aggregation, AggregationTemporality};
use crate::data::{InstrumentType, MetricData};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("exporter is shut down")]
    Shutdown,
    #[error("failed to encode export request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Compression(#[from] CompressionError),
    #[error("metric \"{metric}\" is a {instrument}; only number points can be exported")]
    UnsupportedInstrument {
        metric: String,
        instrument: &'static str,
    },
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Push-based metric exporter.
pub trait MetricExporter: Any + Closeable + Debug + Send + Sync {
    fn export(&self, metrics: &[MetricData]) -> Result<(), ExportError>;

    fn flush(&self) -> Result<(), ExportError> {
        Ok(())
    }

    /// Stop accepting exports. Idempotent.
    fn shutdown(&self) -> Result<(), ExportError>;

    fn aggregation_temporality(&self, instrument: InstrumentType) -> AggregationTemporality;

    fn default_aggregation(&self, _instrument: InstrumentType) -> Aggregation {
        Aggregation::Default
    }
}

/// Recover the concrete exporter behind a trait object.
pub fn downcast_exporter<T: MetricExporter>(exporter: &dyn MetricExporter) -> Option<&T> {
    let any: &dyn Any = exporter;
    any.downcast_ref::<T>()
}
