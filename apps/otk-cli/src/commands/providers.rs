use anyhow::Result;
use clap::Args;
use otk_config::model::PushMetricExporterModel;
use otk_config::ComponentProvider;
use otk_exporter::MetricExporter;
use otk_spi::SpiHelper;
use serde_json::json;

#[derive(Args)]
pub struct ProvidersArgs {
    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: ProvidersArgs) -> Result<()> {
    let spi = SpiHelper::global();
    let mut plugins: Vec<String> = spi
        .load::<dyn ComponentProvider<dyn MetricExporter>>()
        .iter()
        .map(|provider| provider.name().to_string())
        .collect();
    plugins.sort();
    let shadowed: Vec<&String> = plugins
        .iter()
        .filter(|name| is_builtin(name))
        .collect();
    if !shadowed.is_empty() {
        tracing::warn!(?shadowed, "plugins named after built-in exporters are never used");
    }
    super::print_json(
        &json!({
            "builtin": [PushMetricExporterModel::CONSOLE, PushMetricExporterModel::OTLP],
            "plugins": plugins,
        }),
        args.pretty,
    );
    Ok(())
}

fn is_builtin(name: &str) -> bool {
    name == PushMetricExporterModel::OTLP || name == PushMetricExporterModel::CONSOLE
}
