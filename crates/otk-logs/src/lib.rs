//! Typed attribute values carried by log records and metric points.
//!
//! [`AnyValue`] mirrors the OTLP `AnyValue` union. Every variant is immutable
//! once built; [`AnyValueBytes`] copies its input so the caller can keep
//! mutating its own buffer.

mod bytes_value;
mod value;

pub use bytes_value::AnyValueBytes;
pub use value::{AnyValue, AnyValueType, KeyAnyValue};
