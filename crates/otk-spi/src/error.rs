use thiserror::Error;

/// Errors raised while populating a registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a provider named \"{name}\" is already registered for {capability}")]
    DuplicateProvider {
        capability: &'static str,
        name: String,
    },
}
