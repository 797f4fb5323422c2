use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use otk_config::model::OpenTelemetryConfigurationModel;
use otk_config::{parse_path, ResourceRegistry};
use otk_exporter::create_metric_exporters;
use otk_spi::SpiHelper;
use serde_json::json;

#[derive(Args)]
pub struct ValidateArgs {
    /// Configuration document (.yaml, .yml, .json or .toml)
    pub path: PathBuf,
    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let model: OpenTelemetryConfigurationModel = parse_path(&args.path)
        .with_context(|| format!("failed to parse {}", args.path.display()))?;

    let spi = SpiHelper::global();
    let mut resources = ResourceRegistry::new();
    let resolved = create_metric_exporters(&model, &spi, &mut resources);
    // rendered before release so the summary shows the exporters as built
    let names: Option<Vec<String>> = resolved
        .as_ref()
        .ok()
        .map(|exporters| exporters.iter().map(|e| format!("{e:?}")).collect());
    let resource_count = resources.len();
    let closed = resources.close_all();

    resolved.with_context(|| {
        format!("failed to resolve metric exporters in {}", args.path.display())
    })?;
    closed.map_err(|failures| {
        let reasons: Vec<String> = failures.iter().map(ToString::to_string).collect();
        anyhow!("failed to release resources: {}", reasons.join("; "))
    })?;

    super::print_json(
        &json!({
            "file_format": model.file_format,
            "exporters": names.unwrap_or_default(),
            "resources": resource_count,
        }),
        args.pretty,
    );
    Ok(())
}
