use std::sync::Arc;

use otk_spi::SpiHelper;
use serde_json::{Map, Value};

use crate::{DeclarativeConfigError, DeclarativeConfigProperties, ResourceRegistry};

/// A component kind that can be built from configuration, such as
/// `dyn MetricExporter`.
pub trait Capability: 'static {
    /// Fully-qualified name used in operator-facing diagnostics.
    const NAME: &'static str;
}

/// Builds a `T` from a configuration node under a plugin name.
///
/// Providers are registered for the capability `dyn ComponentProvider<T>`:
///
/// ```ignore
/// otk_spi::register_provider!(
///     dyn ComponentProvider<dyn MetricExporter>,
///     "test",
///     TestMetricExporterProvider
/// );
/// ```
pub trait ComponentProvider<T: ?Sized>: Send + Sync {
    /// Name matched against the configuration key.
    fn name(&self) -> &str;

    fn create(&self, config: &DeclarativeConfigProperties)
        -> Result<Arc<T>, DeclarativeConfigError>;
}

/// Turns a configuration model into a component.
pub trait Factory<M, R> {
    fn create(
        &self,
        model: &M,
        spi: &SpiHelper,
        resources: &mut ResourceRegistry,
    ) -> Result<R, DeclarativeConfigError>;
}

/// Resolve a plugin component by name.
///
/// The first `dyn ComponentProvider<T>` whose name equals `name` is invoked
/// with a read-only view of `config`, and its result is returned as-is.
pub fn load_component<T>(
    spi: &SpiHelper,
    name: &str,
    config: Map<String, Value>,
) -> Result<Arc<T>, DeclarativeConfigError>
where
    T: Capability + ?Sized,
{
    let providers = spi.load::<dyn ComponentProvider<T>>();
    tracing::debug!(
        capability = T::NAME,
        name,
        candidates = providers.len(),
        "resolving component provider"
    );
    let provider = providers
        .into_iter()
        .find(|provider| provider.name() == name)
        .ok_or_else(|| {
            DeclarativeConfigError::new(format!(
                "No component provider detected for {} with name \"{}\".",
                T::NAME,
                name
            ))
        })?;
    let properties = DeclarativeConfigProperties::from_map(config, spi.component_loader());
    provider.create(&properties)
}
