//! Blocking session, `SyncSession`.
//!
//! One `reqwest::blocking::Client` per handle, built on first use. Every verb
//! holds the handle's re-entrant lock while it touches the pool and sends, and
//! drops it before the status is checked. Callers that need parallel traffic
//! use several handles or [`AioSession`](super::AioSession).

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::ReentrantMutex;
use reqwest::blocking::{Client, RequestBuilder, Response};

use super::{timeout_or_default, Headers, Params, Payload, Session};
use crate::error::HttpError;

/// Blocking session handle.
pub struct SyncSession {
    pool: ReentrantMutex<RefCell<Option<Arc<Client>>>>,
}

impl SyncSession {
    pub fn new() -> Self {
        Self {
            pool: ReentrantMutex::new(RefCell::new(None)),
        }
    }

    /// Wrap an externally managed pool.
    pub fn with_pool(pool: Arc<Client>) -> Self {
        Self {
            pool: ReentrantMutex::new(RefCell::new(Some(pool))),
        }
    }

    /// Return the handle's pool, building it on first access.
    pub fn ensure_pool(&self) -> Result<Arc<Client>, HttpError> {
        let guard = self.pool.lock();
        let mut slot = guard.borrow_mut();
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }
        tracing::debug!("building blocking connection pool");
        let pool = Arc::new(Client::builder().build()?);
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Replace the pool. Later calls on this handle use exactly `pool`.
    pub fn set_pool(&self, pool: Arc<Client>) {
        let guard = self.pool.lock();
        *guard.borrow_mut() = Some(pool);
    }

    pub fn has_pool(&self) -> bool {
        self.pool.lock().borrow().is_some()
    }

    /// Run `build` against the pool and send, holding the handle lock.
    fn send<F>(&self, method: &str, url: &str, build: F) -> Result<Response, HttpError>
    where
        F: FnOnce(&Client) -> RequestBuilder,
    {
        let resp = {
            let _guard = self.pool.lock();
            let pool = self.ensure_pool()?;
            tracing::debug!(method, url, "sending request");
            build(&pool).send()?
        };
        check_status(resp)
    }
}

impl Default for SyncSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
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
fn check_status(resp: Response) -> Result<Response, HttpError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().unwrap_or_default();
    tracing::warn!(status = status.as_u16(), url = %url, "request failed");
    Err(HttpError::Status {
        status: status.as_u16(),
        body,
    })
}

impl Session for SyncSession {
    fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<Response, HttpError> {
        self.send("GET", url, |pool| {
            let mut req = with_headers(pool.get(url), headers).timeout(timeout_or_default(timeout));
            if let Some(p) = params {
                req = req.query(p);
            }
            req
        })
    }

    fn post(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
        params: Option<&Params>,
    ) -> Result<Response, HttpError> {
        self.send("POST", url, |pool| {
            let mut req = with_headers(pool.post(url), headers).timeout(timeout_or_default(timeout));
            if let Some(p) = params {
                req = req.query(p);
            }
            with_body(req, data)
        })
    }

    fn put(
        &self,
        url: &str,
        headers: &Headers,
        data: Payload,
        timeout: Option<Duration>,
    ) -> Result<Response, HttpError> {
        self.send("PUT", url, |pool| {
            let req = with_headers(pool.put(url), headers).timeout(timeout_or_default(timeout));
            with_body(req, data)
        })
    }

    fn delete(
        &self,
        url: &str,
        headers: &Headers,
        params: Option<&Params>,
        timeout: Option<Duration>,
    ) -> Result<Response, HttpError> {
        self.send("DELETE", url, |pool| {
            let mut req = with_headers(pool.delete(url), headers).timeout(timeout_or_default(timeout));
            if let Some(p) = params {
                req = req.query(p);
            }
            req
        })
    }
}
