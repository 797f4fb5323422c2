use std::sync::Arc;

use crate::error::RegistryError;
use crate::loader::{ComponentLoader, ProviderEntry, SpiKey};

/// Explicit, in-memory provider registry.
///
/// Populated once at startup and read afterwards. Enumeration follows
/// registration order, and a (capability, name) pair can only be registered
/// once.
#[derive(Default, Debug)]
pub struct ComponentRegistry {
    entries: Vec<ProviderEntry>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S>(
        &mut self,
        name: impl Into<Arc<str>>,
        provider: Arc<S>,
    ) -> Result<(), RegistryError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let entry = ProviderEntry::new::<S>(name, provider);
        if self
            .entries
            .iter()
            .any(|e| e.spi == entry.spi && e.name == entry.name)
        {
            return Err(RegistryError::DuplicateProvider {
                capability: entry.spi.name(),
                name: entry.name.to_string(),
            });
        }
        tracing::debug!(capability = entry.spi.name(), name = %entry.name, "provider registered");
        self.entries.push(entry);
        Ok(())
    }

    /// Builder-style [`ComponentRegistry::register`].
    pub fn with<S>(
        mut self,
        name: impl Into<Arc<str>>,
        provider: Arc<S>,
    ) -> Result<Self, RegistryError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.register::<S>(name, provider)?;
        Ok(self)
    }

    pub fn names<S: ?Sized + 'static>(&self) -> Vec<Arc<str>> {
        let spi = SpiKey::of::<S>();
        self.entries
            .iter()
            .filter(|e| e.spi == spi)
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ComponentLoader for ComponentRegistry {
    fn load_entries(&self, spi: SpiKey) -> Vec<ProviderEntry> {
        self.entries
            .iter()
            .filter(|e| e.spi.type_id() == spi.type_id())
            .cloned()
            .collect()
    }
}

/// Concatenates several loaders. Earlier loaders are enumerated first, so
/// first-match lookups prefer them.
#[derive(Default, Clone)]
pub struct ChainedComponentLoader {
    loaders: Vec<Arc<dyn ComponentLoader>>,
}

impl ChainedComponentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, loader: Arc<dyn ComponentLoader>) -> Self {
        self.loaders.push(loader);
        self
    }
}

impl ComponentLoader for ChainedComponentLoader {
    fn load_entries(&self, spi: SpiKey) -> Vec<ProviderEntry> {
        self.loaders
            .iter()
            .flat_map(|loader| loader.load_entries(spi))
            .collect()
    }
}
