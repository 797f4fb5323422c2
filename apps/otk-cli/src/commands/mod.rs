pub mod compressors;
pub mod providers;
pub mod validate;

pub use compressors::CompressorsArgs;
pub use providers::ProvidersArgs;
pub use validate::ValidateArgs;

/// Print `value` as JSON, pretty when asked.
pub(crate) fn print_json(value: &serde_json::Value, pretty: bool) {
    if pretty {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        );
    } else {
        println!("{}", value);
    }
}
