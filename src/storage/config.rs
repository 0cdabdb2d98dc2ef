//! Storage endpoint configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Anonymous, SharedTokenSource, TokenSource};
use crate::error::Error;
use crate::network;

/// JSON API root, media upload root, credentials and per-call timeout.
#[derive(Clone)]
pub struct StorageConfig {
    pub(crate) api_root: String,
    pub(crate) upload_root: String,
    pub(crate) token: SharedTokenSource,
    pub(crate) timeout: Option<Duration>,
}

impl StorageConfig {
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::default()
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn upload_root(&self) -> &str {
        &self.upload_root
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("api_root", &self.api_root)
            .field("upload_root", &self.upload_root)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Default)]
pub struct StorageConfigBuilder {
    api_root: Option<String>,
    upload_root: Option<String>,
    token: Option<SharedTokenSource>,
    timeout: Option<Duration>,
}

impl StorageConfigBuilder {
    pub fn api_root(mut self, url: &str) -> Self {
        self.api_root = Some(url.trim_end_matches('/').to_string());
        self
    }

    pub fn upload_root(mut self, url: &str) -> Self {
        self.upload_root = Some(url.trim_end_matches('/').to_string());
        self
    }

    pub fn token(mut self, token: impl TokenSource + 'static) -> Self {
        self.token = Some(Arc::new(token));
        self
    }

    pub fn shared_token(mut self, token: Arc<dyn TokenSource>) -> Self {
        self.token = Some(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the configuration.
    ///
    /// With neither root set, `STORAGE_EMULATOR_HOST` points both roots at the
    /// emulator and drops the token. A root set on its own derives the other
    /// from the same host (`.../storage/v1` ↔ `.../upload/storage/v1`).
    pub fn build(self) -> Result<StorageConfig, Error> {
        let token = self.token.unwrap_or_else(|| Arc::new(Anonymous));

        let (api_root, upload_root, token): (String, String, SharedTokenSource) =
            match (self.api_root, self.upload_root) {
                (Some(api), Some(upload)) => (api, upload, token),
                (Some(api), None) => {
                    let upload = derive_upload_root(&api)?;
                    (api, upload, token)
                }
                (None, Some(upload)) => {
                    let api = derive_api_root(&upload)?;
                    (api, upload, token)
                }
                (None, None) => match network::emulator_host(network::STORAGE_EMULATOR_HOST) {
                    Some(host) => {
                        tracing::debug!(host = %host, "using Storage emulator");
                        let (api, upload) = network::storage_emulator_roots(&host);
                        (api, upload, Arc::new(Anonymous))
                    }
                    None => (
                        network::STORAGE_API_ROOT.to_string(),
                        network::STORAGE_UPLOAD_ROOT.to_string(),
                        token,
                    ),
                },
            };

        Ok(StorageConfig {
            api_root,
            upload_root,
            token,
            timeout: self.timeout,
        })
    }
}

fn derive_upload_root(api_root: &str) -> Result<String, Error> {
    api_root
        .strip_suffix("/storage/v1")
        .map(|base| format!("{}/upload/storage/v1", base))
        .ok_or_else(|| {
            Error::Validation(format!(
                "cannot derive upload root from {:?}; set upload_root explicitly",
                api_root
            ))
        })
}

fn derive_api_root(upload_root: &str) -> Result<String, Error> {
    upload_root
        .strip_suffix("/upload/storage/v1")
        .map(|base| format!("{}/storage/v1", base))
        .ok_or_else(|| {
            Error::Validation(format!(
                "cannot derive API root from {:?}; set api_root explicitly",
                upload_root
            ))
        })
}
