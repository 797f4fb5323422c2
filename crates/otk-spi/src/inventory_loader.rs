use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::loader::{ComponentLoader, ErasedProvider, ProviderEntry, SpiKey};

/// A link-time registration, submitted through [`crate::register_provider!`].
pub struct ProviderRegistration {
    spi: fn() -> TypeId,
    spi_name: fn() -> &'static str,
    name: &'static str,
    factory: fn() -> ErasedProvider,
}

impl ProviderRegistration {
    pub const fn new<S>(name: &'static str, factory: fn() -> ErasedProvider) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        Self {
            spi: TypeId::of::<S>,
            spi_name: std::any::type_name::<S>,
            name,
            factory,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn key(&self) -> SpiKey {
        SpiKey::from_parts((self.spi)(), (self.spi_name)())
    }
}

inventory::collect!(ProviderRegistration);

/// Loader over every [`ProviderRegistration`] linked into the binary.
///
/// Factories run once, on first use, and the resulting providers are reused
/// for the lifetime of the loader. When two registrations share a capability
/// and name, the first one enumerated wins.
#[derive(Default)]
pub struct InventoryComponentLoader {
    entries: OnceCell<Vec<ProviderEntry>>,
}

impl InventoryComponentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> &[ProviderEntry] {
        self.entries.get_or_init(|| {
            let mut seen: HashSet<(TypeId, &'static str)> = HashSet::new();
            let mut out = Vec::new();
            for registration in inventory::iter::<ProviderRegistration> {
                let spi = registration.key();
                if !seen.insert((spi.type_id(), registration.name)) {
                    tracing::warn!(
                        capability = spi.name(),
                        name = registration.name,
                        "duplicate provider registration ignored"
                    );
                    continue;
                }
                out.push(ProviderEntry {
                    spi,
                    name: Arc::from(registration.name),
                    provider: (registration.factory)(),
                });
            }
            tracing::debug!(providers = out.len(), "provider registry initialised");
            out
        })
    }
}

impl ComponentLoader for InventoryComponentLoader {
    fn load_entries(&self, spi: SpiKey) -> Vec<ProviderEntry> {
        self.entries()
            .iter()
            .filter(|entry| entry.spi.type_id() == spi.type_id())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComponentLoaderExt;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }

    struct Triangle;
    impl Shape for Triangle {
        fn sides(&self) -> u32 {
            3
        }
    }

    struct Square;
    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    struct Impostor;
    impl Shape for Impostor {
        fn sides(&self) -> u32 {
            0
        }
    }

    crate::register_provider!(dyn Shape, "triangle", Triangle);
    crate::register_provider!(dyn Shape, "square", Square);
    crate::register_provider!(dyn Shape, "square", Impostor);

    #[test]
    fn enumerates_link_time_registrations() {
        let loader = InventoryComponentLoader::new();
        let mut shapes: Vec<(String, u32)> = loader
            .load_named::<dyn Shape>()
            .into_iter()
            .map(|(name, shape)| (name.to_string(), shape.sides()))
            .collect();
        shapes.sort();
        assert_eq!(shapes.len(), 2, "duplicate name enumerated once");
        assert_eq!(shapes[1].0, "triangle");
        assert_eq!(shapes[0].0, "square");
    }

    #[test]
    fn unknown_capability_is_empty() {
        let loader = InventoryComponentLoader::new();
        assert!(loader.load::<dyn std::error::Error + Send + Sync>().is_empty());
    }

    #[test]
    fn providers_are_cached_per_loader() {
        let loader = InventoryComponentLoader::new();
        let first = loader.load::<dyn Shape>();
        let second = loader.load::<dyn Shape>();
        assert!(first
            .iter()
            .zip(second.iter())
            .all(|(a, b)| Arc::ptr_eq(a, b)));
    }
}
