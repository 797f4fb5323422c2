use std::sync::Arc;

use otk_config::model::{OpenTelemetryConfigurationModel, PushMetricExporterModel};
use otk_config::{
    load_component, DeclarativeConfigError, DeclarativeConfigProperties, Factory,
    ResourceRegistry,
};
use otk_spi::SpiHelper;

use crate::exporter::MetricExporter;
use crate::providers::{create_console_exporter, create_otlp_exporter};

/// Resolves a metric exporter node to an exporter.
///
/// `otlp` and `console` are built in and never looked up among plugins,
/// including when they arrive as a `Named` node; any other key names a
/// `dyn ComponentProvider<dyn MetricExporter>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricExporterFactory {
    _private: (),
}

static INSTANCE: MetricExporterFactory = MetricExporterFactory { _private: () };

impl MetricExporterFactory {
    pub fn instance() -> &'static MetricExporterFactory {
        &INSTANCE
    }
}

impl Factory<PushMetricExporterModel, Arc<dyn MetricExporter>> for MetricExporterFactory {
    fn create(
        &self,
        model: &PushMetricExporterModel,
        spi: &SpiHelper,
        resources: &mut ResourceRegistry,
    ) -> Result<Arc<dyn MetricExporter>, DeclarativeConfigError> {
        let canonical = model
            .canonical()
            .map_err(|err| DeclarativeConfigError::new(err.to_string()))?;
        let exporter: Arc<dyn MetricExporter> = match canonical.as_ref() {
            PushMetricExporterModel::Otlp(otlp) => {
                let config = DeclarativeConfigProperties::from_model(otlp, spi.component_loader())?;
                create_otlp_exporter(&config, resources)?
            }
            PushMetricExporterModel::Console(console) => {
                let config =
                    DeclarativeConfigProperties::from_model(console, spi.component_loader())?;
                create_console_exporter(&config, resources)?
            }
            PushMetricExporterModel::Named(name, config) => {
                load_component::<dyn MetricExporter>(spi, name, config.clone())?
            }
        };
        tracing::debug!(exporter = model.key(), "metric exporter created");
        resources.push(exporter.clone());
        Ok(exporter)
    }
}

/// Resolve every periodic reader's exporter in document order. Stops at the
/// first failure; exporters created before it stay in `resources`.
pub fn create_metric_exporters(
    config: &OpenTelemetryConfigurationModel,
    spi: &SpiHelper,
    resources: &mut ResourceRegistry,
) -> Result<Vec<Arc<dyn MetricExporter>>, DeclarativeConfigError> {
    let Some(meter_provider) = &config.meter_provider else {
        return Ok(Vec::new());
    };
    if config.disabled == Some(true) {
        tracing::info!("sdk disabled; skipping metric exporters");
        return Ok(Vec::new());
    }
    meter_provider
        .readers
        .iter()
        .filter_map(|reader| reader.periodic.as_ref())
        .map(|periodic| MetricExporterFactory::instance().create(&periodic.exporter, spi, resources))
        .collect()
}
