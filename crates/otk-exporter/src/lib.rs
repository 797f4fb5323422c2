//! Metric exporters and their declarative factory.
//!
//! [`MetricExporterFactory`] turns a `PushMetricExporterModel` into an
//! exporter. The `otlp` and `console` variants are built in; plugins
//! register a `dyn ComponentProvider<dyn MetricExporter>`:
//!
//! ```ignore
//! otk_spi::register_provider!(
//!     dyn ComponentProvider<dyn MetricExporter>,
//!     "test",
//!     TestExporterProvider
//! );
//! ```

mod aggregation;
mod data;
mod exporter;
mod factory;
mod logging;
pub mod otlp;
mod providers;

pub use aggregation::{
    Aggregation, AggregationTemporality, AggregationTemporalitySelector,
    DefaultAggregationSelector, DEFAULT_BUCKET_BOUNDARIES,
};
pub use data::{InstrumentType, MetricData, NumberPoint};
pub use exporter::{downcast_exporter, ExportError, MetricExporter};
pub use factory::{create_metric_exporters, MetricExporterFactory};
pub use logging::{LoggingMetricExporter, EXPORT_TARGET};
pub use providers::{create_console_exporter, create_otlp_exporter};

impl otk_config::Capability for dyn MetricExporter {
    const NAME: &'static str = "otk_exporter::MetricExporter";
}
