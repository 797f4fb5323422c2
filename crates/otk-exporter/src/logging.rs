use std::sync::atomic::{AtomicBool, Ordering};

use otk_config::{CloseError, Closeable};

use crate::aggregation::{AggregationTemporality, AggregationTemporalitySelector};
use crate::data::{InstrumentType, MetricData};
use crate::exporter::{ExportError, MetricExporter};

pub const EXPORT_TARGET: &str = "otk.export";

/// Writes every exported metric point as a `tracing` event.
#[derive(Debug)]
pub struct LoggingMetricExporter {
    temporality: AggregationTemporalitySelector,
    shutdown: AtomicBool,
}

impl LoggingMetricExporter {
    pub fn new() -> Self {
        Self::with_temporality(AggregationTemporalitySelector::always_cumulative())
    }

    pub fn with_temporality(temporality: AggregationTemporalitySelector) -> Self {
        Self {
            temporality,
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

impl Default for LoggingMetricExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricExporter for LoggingMetricExporter {
    fn export(&self, metrics: &[MetricData]) -> Result<(), ExportError> {
        if self.is_shutdown() {
            return Err(ExportError::Shutdown);
        }
        for metric in metrics {
            for point in &metric.points {
                let attributes = point
                    .attributes
                    .iter()
                    .map(|kv| format!("{}={}", kv.key, kv.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::info!(
                    target: EXPORT_TARGET,
                    metric = %metric.name,
                    instrument = metric.instrument_type.as_str(),
                    unit = %metric.unit,
                    value = point.value,
                    attributes = %attributes,
                    "metric"
                );
            }
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ExportError> {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            tracing::debug!("logging metric exporter already shut down");
        }
        Ok(())
    }

    fn aggregation_temporality(&self, instrument: InstrumentType) -> AggregationTemporality {
        self.temporality.select(instrument)
    }
}

impl Closeable for LoggingMetricExporter {
    fn close(&self) -> Result<(), CloseError> {
        self.shutdown()
            .map_err(|err| CloseError::new("LoggingMetricExporter", err.to_string()))
    }
}
