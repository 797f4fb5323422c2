use anyhow::Result;
use clap::Args;
use otk_spi::SpiHelper;
use serde_json::json;

#[derive(Args)]
pub struct CompressorsArgs {
    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: CompressorsArgs) -> Result<()> {
    let spi = SpiHelper::global();
    let mut methods = vec![otk_compress::NONE.to_string()];
    methods.extend(otk_compress::supported_methods(&spi.component_loader()));
    super::print_json(&json!({ "compression": methods }), args.pretty);
    Ok(())
}
