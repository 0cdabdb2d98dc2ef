//! The session capability traits.
//!
//! [`Session`] is the blocking capability, [`AsyncSession`] the suspending one.
//! Each variant implements all four verbs; API clients are generic over the
//! trait matching their flavour.

#[cfg(any(feature = "aio", feature = "blocking"))]
use std::sync::Arc;
#[cfg(any(feature = "aio", feature = "blocking"))]
use std::time::Duration;

#[cfg(any(feature = "aio", feature = "blocking"))]
use super::{Headers, Params, Payload};
#[cfg(any(feature = "aio", feature = "blocking"))]
use crate::error::HttpError;

/// Blocking session: perform a verb, fail on a non-success status.
///
/// `timeout: None` means [`DEFAULT_TIMEOUT_SECS`](super::DEFAULT_TIMEOUT_SECS).
#[cfg(feature = "blocking")]
pub trait Session: Send + Sync {
    fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::blocking::Response, HttpError>;

    fn post(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::blocking::Response, HttpError>;

    fn put(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, HttpError>;

    fn delete(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&Params>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, HttpError>;
}

/// Non-blocking session: perform a verb, fail on a non-success status.
///
/// `timeout: None` means [`DEFAULT_TIMEOUT_SECS`](super::DEFAULT_TIMEOUT_SECS).
#[cfg(feature = "aio")]
#[async_trait::async_trait]
pub trait AsyncSession: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::Response, HttpError>;

    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::Response, HttpError>;

    async fn put(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HttpError>;

    async fn delete(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&Params>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HttpError>;
}

// ── Shared handles ───────────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
impl<T: Session + ?Sized> Session for Arc<T> {
    fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        (**self).get(url, headers, timeout, params)
    }

    fn post(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        (**self).post(url, headers, data, timeout, params)
    }

    fn put(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        (**self).put(url, headers, data, timeout)
    }

    fn delete(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&Params>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        (**self).delete(url, headers, params, timeout)
    }
}

#[cfg(feature = "aio")]
#[async_trait::async_trait]
impl<T: AsyncSession + ?Sized> AsyncSession for Arc<T> {
    async fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::Response, HttpError> {
        (**self).get(url, headers, timeout, params).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::Response, HttpError> {
        (**self).post(url, headers, data, timeout, params).await
    }

    async fn put(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HttpError> {
        (**self).put(url, headers, data, timeout).await
    }

    async fn delete(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&Params>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HttpError> {
        (**self).delete(url, headers, params, timeout).await
    }
}

#[cfg(feature = "blocking")]
impl<T: Session + ?Sized> Session for &T {
    fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        (**self).get(url, headers, timeout, params)
    }

    fn post(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        (**self).post(url, headers, data, timeout, params)
    }

    fn put(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        (**self).put(url, headers, data, timeout)
    }

    fn delete(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&Params>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, HttpError> {
        (**self).delete(url, headers, params, timeout)
    }
}

#[cfg(feature = "aio")]
#[async_trait::async_trait]
impl<T: AsyncSession + ?Sized> AsyncSession for &T {
    async fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::Response, HttpError> {
        (**self).get(url, headers, timeout, params).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<reqwest::Response, HttpError> {
        (**self).post(url, headers, data, timeout, params).await
    }

    async fn put(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HttpError> {
        (**self).put(url, headers, data, timeout).await
    }

    async fn delete(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&Params>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, HttpError> {
        (**self).delete(url, headers, params, timeout).await
    }
}
