//! Non-blocking session, `AioSession`.
//!
//! One `reqwest::Client` per handle, built on first use with the handle's
//! connect and read timeouts. Requests take no lock: the async pool is shared
//! by every in-flight call on the handle.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::{timeout_or_default, AsyncSession, Headers, Params, Payload, DEFAULT_TIMEOUT_SECS};
use crate::error::HttpError;

/// Non-blocking session handle.
pub struct AioSession {
    pub conn_timeout: Duration,
    pub read_timeout: Duration,
    pool: OnceLock<Arc<Client>>,
}

impl AioSession {
    pub fn new(conn_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            conn_timeout,
            read_timeout,
            pool: OnceLock::new(),
        }
    }

    /// Wrap an externally managed pool.
    pub fn with_pool(pool: Arc<Client>) -> Self {
        let mut session = Self::default();
        session.set_pool(pool);
        session
    }

    /// Return the handle's pool, building it on first access.
    pub fn ensure_pool(&self) -> Result<Arc<Client>, HttpError> {
        if let Some(pool) = self.pool.get() {
            return Ok(pool.clone());
        }
        tracing::debug!(
            conn_timeout_ms = self.conn_timeout.as_millis() as u64,
            read_timeout_ms = self.read_timeout.as_millis() as u64,
            "building async connection pool"
        );
        let built = Arc::new(
            Client::builder()
                .connect_timeout(self.conn_timeout)
                .read_timeout(self.read_timeout)
                .build()?,
        );
        // A concurrent first call may have won the race; keep whichever landed.
        Ok(self.pool.get_or_init(|| built).clone())
    }

    /// Replace the pool. Takes `&mut self`, so no request can be in flight.
    pub fn set_pool(&mut self, pool: Arc<Client>) {
        self.pool = OnceLock::from(pool);
    }

    pub fn has_pool(&self) -> bool {
        self.pool.get().is_some()
    }

    async fn send(&self, method: &str, url: &str, req: RequestBuilder) -> Result<Response, HttpError> {
        tracing::debug!(method, url, "sending request");
        let resp = req.send().await?;
        check_status(resp).await
    }
}

impl Default for AioSession {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}

impl std::fmt::Debug for AioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AioSession")
            .field("conn_timeout", &self.conn_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("has_pool", &self.has_pool())
            .finish()
    }
}

fn with_headers(mut req: RequestBuilder, headers: &Headers) -> RequestBuilder {
    for (name, value) in headers {
        req = req.header(name, value);
    }
    req
}

fn with_body(req: RequestBuilder, data: Payload) -> RequestBuilder {
    match data {
        Payload::Empty => req,
        Payload::Text(s) => req.body(s),
        Payload::Bytes(b) => req.body(b),
    }
}

/// Turn a non-success response into `HttpError::Status`.
async fn check_status(resp: Response) -> Result<Response, HttpError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), url = %url, "request failed");
    Err(HttpError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl AsyncSession for AioSession {
    async fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<Response, HttpError> {
        let pool = self.ensure_pool()?;
        let mut req = with_headers(pool.get(url), headers).timeout(timeout_or_default(timeout));
        if let Some(p) = params {
            req = req.query(p);
        }
        self.send("GET", url, req).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<Response, HttpError> {
        let pool = self.ensure_pool()?;
        let mut req = with_headers(pool.post(url), headers).timeout(timeout_or_default(timeout));
        if let Some(p) = params {
            req = req.query(p);
        }
        self.send("POST", url, with_body(req, data)).await
    }

    async fn put(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
    ) -> Result<Response, HttpError> {
        let pool = self.ensure_pool()?;
        let req = with_headers(pool.put(url), headers).timeout(timeout_or_default(timeout));
        self.send("PUT", url, with_body(req, data)).await
    }

    async fn delete(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&Params>,
        timeout: Option<Duration>,
    ) -> Result<Response, HttpError> {
        let pool = self.ensure_pool()?;
        let mut req = with_headers(pool.delete(url), headers).timeout(timeout_or_default(timeout));
        if let Some(p) = params {
            req = req.query(p);
        }
        self.send("DELETE", url, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let session = AioSession::default();
        assert_eq!(session.conn_timeout, Duration::from_secs(10));
        assert_eq!(session.read_timeout, Duration::from_secs(10));
        assert!(!session.has_pool());
    }

    #[tokio::test]
    async fn test_pool_is_lazy_and_stable() {
        let session = AioSession::new(Duration::from_secs(2), Duration::from_secs(5));
        let first = session.ensure_pool().unwrap();
        let second = session.ensure_pool().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_set_pool_overrides() {
        let mut session = AioSession::default();
        let built = session.ensure_pool().unwrap();

        let injected = Arc::new(Client::new());
        session.set_pool(injected.clone());

        let current = session.ensure_pool().unwrap();
        assert!(Arc::ptr_eq(&current, &injected));
        assert!(!Arc::ptr_eq(&current, &built));
    }
}
