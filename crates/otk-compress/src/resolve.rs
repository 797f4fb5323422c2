use std::collections::BTreeMap;
use std::sync::Arc;

use otk_spi::{ComponentLoader, ComponentLoaderExt};

use crate::{CompressionError, Compressor, CompressorProvider, GzipCompressor};

/// Method name meaning "send uncompressed".
pub const NONE: &str = "none";

fn registered_compressors<L>(loader: &L) -> BTreeMap<String, Arc<dyn Compressor>>
where
    L: ComponentLoader + ?Sized,
{
    let mut compressors: BTreeMap<String, Arc<dyn Compressor>> = BTreeMap::new();
    for provider in loader.load::<dyn CompressorProvider>() {
        let compressor = provider.instance();
        compressors.insert(compressor.encoding().to_string(), compressor);
    }
    // gzip is built in and always shadows a plugin claiming the same encoding
    let gzip: Arc<dyn Compressor> = GzipCompressor::instance();
    compressors.insert(gzip.encoding().to_string(), gzip);
    compressors
}

/// Validate that `method` is `"none"` or names a known compressor.
///
/// Returns `Ok(None)` for `"none"`. Every call re-enumerates the loader.
pub fn validate_and_resolve_compressor<L>(
    method: &str,
    loader: &L,
) -> Result<Option<Arc<dyn Compressor>>, CompressionError>
where
    L: ComponentLoader + ?Sized,
{
    if method == NONE {
        return Ok(None);
    }

    let mut compressors = registered_compressors(loader);
    match compressors.remove(method) {
        Some(compressor) => {
            tracing::debug!(method, "compression method resolved");
            Ok(Some(compressor))
        }
        None => {
            let names: Vec<&str> = compressors.keys().map(String::as_str).collect();
            Err(CompressionError::InvalidArgument(format!(
                "Unsupported compressionMethod. Compression method must be \"none\" or one of: [{}]",
                names.join(",")
            )))
        }
    }
}

/// Sorted encodings currently resolvable, excluding `"none"`.
pub fn supported_methods<L>(loader: &L) -> Vec<String>
where
    L: ComponentLoader + ?Sized,
{
    registered_compressors(loader).into_keys().collect()
}
