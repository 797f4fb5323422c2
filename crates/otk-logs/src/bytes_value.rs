use std::fmt;

use bytes::Bytes;

use crate::AnyValueType;

/// Opaque binary attribute value.
///
/// The buffer is copied on construction and only handed out as `&[u8]`, so
/// neither the original caller nor readers can mutate what is stored.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AnyValueBytes {
    raw: Bytes,
}

impl AnyValueBytes {
    pub fn new(value: &[u8]) -> Self {
        Self {
            raw: Bytes::copy_from_slice(value),
        }
    }

    pub fn value_type(&self) -> AnyValueType {
        AnyValueType::Bytes
    }

    /// Read-only view of the stored bytes.
    pub fn value(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Lowercase base16 rendering of the bytes.
    pub fn as_string(&self) -> String {
        hex::encode(&self.raw)
    }
}

impl From<&[u8]> for AnyValueBytes {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for AnyValueBytes {
    fn from(value: Vec<u8>) -> Self {
        // An owned Vec has no outside alias left, so it can be adopted as-is.
        Self {
            raw: Bytes::from(value),
        }
    }
}

impl fmt::Display for AnyValueBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyValueBytes{{{}}}", self.as_string())
    }
}

impl fmt::Debug for AnyValueBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
