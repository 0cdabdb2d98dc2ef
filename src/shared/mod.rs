//! Helpers shared by the Datastore and Storage modules.

pub mod serde_util;

#[cfg(any(feature = "aio", feature = "blocking"))]
use serde::de::DeserializeOwned;
#[cfg(any(feature = "aio", feature = "blocking"))]
use serde_json::error::Category;

#[cfg(any(feature = "aio", feature = "blocking"))]
use crate::error::Error;

/// Percent-encode `segment` as a single URL path segment (`/` becomes `%2F`).
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Parse a response body. Well-formed JSON carrying invalid values (a bad
/// int64 string, an unknown shape) is `Error::Decode`; anything that is not
/// JSON at all stays `Error::Serde`.
#[cfg(any(feature = "aio", feature = "blocking"))]
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => Error::Decode(e.to_string()),
        _ => Error::Serde(e),
    })
}
