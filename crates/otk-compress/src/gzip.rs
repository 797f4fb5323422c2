use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression as GzLevel;
use once_cell::sync::Lazy;

use crate::{CompressionError, Compressor};

static INSTANCE: Lazy<Arc<GzipCompressor>> = Lazy::new(|| Arc::new(GzipCompressor));

/// Built-in gzip compressor.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipCompressor;

impl GzipCompressor {
    pub const ENCODING: &'static str = "gzip";

    pub fn instance() -> Arc<GzipCompressor> {
        INSTANCE.clone()
    }
}

impl Compressor for GzipCompressor {
    fn encoding(&self) -> &str {
        Self::ENCODING
    }

    fn compress(&self, input: &[u8]) -> Result<Bytes, CompressionError> {
        let wrap = |source| CompressionError::Io {
            encoding: Self::ENCODING.to_string(),
            source,
        };
        let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
        encoder.write_all(input).map_err(wrap)?;
        let out = encoder.finish().map_err(wrap)?;
        Ok(Bytes::from(out))
    }
}
