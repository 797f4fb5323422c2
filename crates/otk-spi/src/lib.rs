//! Provider discovery keyed by capability.
//!
//! A capability is any `'static` type, usually a trait object such as
//! `dyn CompressorProvider`. Implementations are shared as `Arc<S>` and are
//! found through a [`ComponentLoader`]:
//!
//! * [`InventoryComponentLoader`] enumerates providers registered at link time
//!   with [`register_provider!`], the process-wide registry.
//! * [`ComponentRegistry`] holds providers registered explicitly at startup.
//! * [`ChainedComponentLoader`] layers several loaders in priority order.
//!
//! ```ignore
//! otk_spi::register_provider!(dyn CompressorProvider, "zstd", ZstdProvider);
//!
//! let spi = otk_spi::SpiHelper::global();
//! let providers = spi.load::<dyn CompressorProvider>();
//! ```

mod error;
mod helper;
mod inventory_loader;
mod loader;
mod registry;

pub use error::RegistryError;
pub use helper::SpiHelper;
pub use inventory_loader::{InventoryComponentLoader, ProviderRegistration};
pub use loader::{ComponentLoader, ComponentLoaderExt, ErasedProvider, ProviderEntry, SpiKey};
pub use registry::{ChainedComponentLoader, ComponentRegistry};

#[doc(hidden)]
pub use inventory;

/// Register a provider for a capability with the process-wide registry.
///
/// `$ctor` is evaluated lazily, once per [`InventoryComponentLoader`], and must
/// produce a value that coerces into `Arc<$spi>`.
#[macro_export]
macro_rules! register_provider {
    ($spi:ty, $name:expr, $ctor:expr $(,)?) => {
        $crate::inventory::submit! {
            $crate::ProviderRegistration::new::<$spi>($name, {
                fn factory() -> $crate::ErasedProvider {
                    let provider: ::std::sync::Arc<$spi> = ::std::sync::Arc::new($ctor);
                    ::std::sync::Arc::new(provider)
                }
                factory
            })
        }
    };
}
