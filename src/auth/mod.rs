//! Access tokens for authenticated requests.
//!
//! Loading service-account files and refreshing tokens happens outside this
//! crate. Callers hand the clients a [`TokenSource`]; when it yields a token the
//! client sends `Authorization: Bearer <token>`.

use std::fmt;
use std::sync::Arc;

use crate::http::Headers;

/// Supplies the current access token.
pub trait TokenSource: Send + Sync {
    /// `None` sends the request unauthenticated (emulators, public buckets).
    fn access_token(&self) -> Option<String>;
}

/// A fixed bearer token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

// Token stays out of logs.
impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// No token: requests go out without an `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenSource for Anonymous {
    fn access_token(&self) -> Option<String> {
        None
    }
}

impl<F> TokenSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn access_token(&self) -> Option<String> {
        self()
    }
}

pub(crate) type SharedTokenSource = Arc<dyn TokenSource>;

/// Headers for a JSON API call: content type plus bearer token if any.
pub(crate) fn json_headers(token: &dyn TokenSource) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    insert_bearer(&mut headers, token);
    headers
}

pub(crate) fn insert_bearer(headers: &mut Headers, token: &dyn TokenSource) {
    if let Some(t) = token.access_token() {
        headers.insert("Authorization".to_string(), format!("Bearer {}", t));
    }
}
