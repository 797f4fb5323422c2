use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::inventory_loader::InventoryComponentLoader;
use crate::loader::{ComponentLoader, ComponentLoaderExt};

static GLOBAL_LOADER: Lazy<Arc<InventoryComponentLoader>> =
    Lazy::new(|| Arc::new(InventoryComponentLoader::new()));

/// Handle that loads providers through a shared [`ComponentLoader`].
#[derive(Clone)]
pub struct SpiHelper {
    loader: Arc<dyn ComponentLoader>,
}

impl SpiHelper {
    /// Helper backed by the process-wide link-time registry.
    pub fn global() -> Self {
        Self {
            loader: GLOBAL_LOADER.clone(),
        }
    }

    pub fn create(loader: Arc<dyn ComponentLoader>) -> Self {
        Self { loader }
    }

    pub fn component_loader(&self) -> Arc<dyn ComponentLoader> {
        self.loader.clone()
    }

    pub fn load<S>(&self) -> Vec<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.loader.load::<S>()
    }
}

impl Default for SpiHelper {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for SpiHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpiHelper").finish_non_exhaustive()
    }
}
