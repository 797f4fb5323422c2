//! Declarative configuration for the otk SDK.
//!
//! A document is parsed into typed models ([`model`]). Factories turn each
//! model node into a component: built-in variants go through a static table,
//! plugin variants through [`load_component`], which finds a
//! [`ComponentProvider`] by name and hands it a read-only
//! [`DeclarativeConfigProperties`] view of the node. Anything a factory
//! allocates along the way is appended to a caller-owned
//! [`ResourceRegistry`].

mod component;
mod document;
mod error;
pub mod model;
mod properties;
mod resources;

pub use component::{load_component, Capability, ComponentProvider, Factory};
pub use document::{
    expand_env_vars_with, parse, parse_path, parse_with, substitute_env_vars,
    substitute_env_vars_with, ConfigFormat,
};
pub use error::{CloseError, DeclarativeConfigError, ParseError};
pub use properties::{DeclarativeConfigProperties, Scalar};
pub use resources::{Closeable, ResourceRegistry};
