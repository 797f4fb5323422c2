//! Payload compressors and compression-method resolution.

mod gzip;
mod resolve;

pub use gzip::GzipCompressor;
pub use resolve::{supported_methods, validate_and_resolve_compressor, NONE};

use std::fmt::Debug;
use std::sync::Arc;

use bytes::Bytes;

/// Errors surfaced by compressors and the resolver.
#[derive(thiserror::Error, Debug)]
pub enum CompressionError {
    /// The requested method has no built-in or registered implementation.
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{encoding} compression failed: {source}")]
    Io {
        encoding: String,
        #[source]
        source: std::io::Error,
    },
}

/// Compression engine contract.
pub trait Compressor: Send + Sync + Debug {
    /// Value of the `Content-Encoding` header this compressor produces.
    fn encoding(&self) -> &str;

    fn compress(&self, input: &[u8]) -> Result<Bytes, CompressionError>;
}

/// Capability through which plugins contribute compressors.
///
/// Registered as `dyn CompressorProvider`:
///
/// ```ignore
/// otk_spi::register_provider!(dyn CompressorProvider, "zstd", ZstdProvider);
/// ```
pub trait CompressorProvider: Send + Sync {
    fn instance(&self) -> Arc<dyn Compressor>;
}
