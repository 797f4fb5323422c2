use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Type-erased provider handle. The inner value is always an `Arc<S>` for the
/// capability `S` named by the owning [`ProviderEntry`].
pub type ErasedProvider = Arc<dyn Any + Send + Sync>;

/// Identity of a capability.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpiKey {
    id: TypeId,
    name: &'static str,
}

impl SpiKey {
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    pub(crate) fn from_parts(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Rust type name of the capability, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for SpiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One discovered (capability, name, provider) triple.
#[derive(Clone)]
pub struct ProviderEntry {
    pub spi: SpiKey,
    pub name: Arc<str>,
    pub provider: ErasedProvider,
}

impl ProviderEntry {
    pub fn new<S>(name: impl Into<Arc<str>>, provider: Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        Self {
            spi: SpiKey::of::<S>(),
            name: name.into(),
            provider: Arc::new(provider),
        }
    }

    /// Recover the typed provider; `None` if `S` is not this entry's capability.
    pub fn downcast<S>(&self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        if self.spi.type_id() != TypeId::of::<S>() {
            return None;
        }
        self.provider.downcast_ref::<Arc<S>>().cloned()
    }
}

impl fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("spi", &self.spi)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Enumerates every provider of a capability visible to the process.
///
/// Order is unspecified unless the implementation documents otherwise. An
/// empty result is not an error; callers decide whether it is.
pub trait ComponentLoader: Send + Sync {
    fn load_entries(&self, spi: SpiKey) -> Vec<ProviderEntry>;
}

/// Typed helpers over any [`ComponentLoader`].
pub trait ComponentLoaderExt: ComponentLoader {
    fn load<S>(&self) -> Vec<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.load_entries(SpiKey::of::<S>())
            .iter()
            .filter_map(ProviderEntry::downcast::<S>)
            .collect()
    }

    fn load_named<S>(&self) -> Vec<(Arc<str>, Arc<S>)>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.load_entries(SpiKey::of::<S>())
            .iter()
            .filter_map(|entry| entry.downcast::<S>().map(|p| (entry.name.clone(), p)))
            .collect()
    }
}

impl<L: ComponentLoader + ?Sized> ComponentLoaderExt for L {}

impl<L: ComponentLoader + ?Sized> ComponentLoader for Arc<L> {
    fn load_entries(&self, spi: SpiKey) -> Vec<ProviderEntry> {
        (**self).load_entries(spi)
    }
}
