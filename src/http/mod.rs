//! HTTP session layer: one capability interface, two variants.
//!
//! - [`Session`] / [`SyncSession`]: blocking, one lazily built pool per handle,
//!   requests serialized by a re-entrant lock.
//! - [`AsyncSession`] / [`AioSession`]: non-blocking, one lazily built pool per
//!   handle, no request locking.
//!
//! Every verb fails with [`HttpError::Status`](crate::error::HttpError::Status)
//! when the server answers with a non-success status.

use std::collections::HashMap;
use std::time::Duration;

pub mod session;

#[cfg(feature = "aio")]
pub mod aio;

#[cfg(feature = "blocking")]
pub mod sync;

#[cfg(feature = "aio")]
pub use aio::AioSession;
#[cfg(feature = "aio")]
pub use session::AsyncSession;
#[cfg(feature = "blocking")]
pub use session::Session;
#[cfg(feature = "blocking")]
pub use sync::SyncSession;

/// Request headers, name → value.
pub type Headers = HashMap<String, String>;

/// Query parameters, name → value.
pub type Params = HashMap<String, String>;

/// Per-call timeout applied when the caller passes `None`.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub(crate) fn timeout_or_default(timeout: Option<Duration>) -> Duration {
    timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    Empty,
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::Empty => 0,
            Payload::Text(s) => s.len(),
            Payload::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON-encode `value` as a text body.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(Payload::Text)
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(b)
    }
}

impl From<&[u8]> for Payload {
    fn from(b: &[u8]) -> Self {
        Payload::Bytes(b.to_vec())
    }
}
