use clap::{Parser, Subcommand};

mod commands;

use commands::{CompressorsArgs, ProvidersArgs, ValidateArgs};

#[derive(Parser)]
#[command(name = "otk-cli", version, about = "otk declarative configuration utilities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a configuration document and resolve its metric exporters
    Validate(ValidateArgs),
    /// List compression methods accepted by exporters (JSON)
    Compressors(CompressorsArgs),
    /// List built-in and plugin metric exporters (JSON)
    Providers(ProvidersArgs),
}

fn main() {
    otk_otel::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Compressors(args) => commands::compressors::run(args),
        Commands::Providers(args) => commands::providers::run(args),
    };
    if let Err(err) = result {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
