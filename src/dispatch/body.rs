//! Response bodies buffered once, read many times.

use bytes::Bytes;
use serde_json::Value;

/// A fully read response body.
///
/// Byte length, text and parsed JSON are all derived from the same buffer,
/// so producing one view never consumes another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedBody {
    bytes: Bytes,
}

impl BufferedBody {
    /// Wraps already-read bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        BufferedBody {
            bytes: bytes.into(),
        }
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for an empty body.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Body as text; invalid UTF-8 is replaced rather than rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Body parsed as JSON, `None` when it is not JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.bytes).ok()
    }
}

/// `Content-Length` header value when present and parseable, else the
/// buffered byte length.
pub fn content_length(header: Option<&str>, body: &BufferedBody) -> u64 {
    header
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(body.len() as u64)
}
