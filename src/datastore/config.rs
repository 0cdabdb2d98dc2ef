//! Datastore endpoint configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Anonymous, SharedTokenSource, TokenSource};
use crate::error::Error;
use crate::network;

/// Where and how the Datastore clients talk to the service.
#[derive(Clone)]
pub struct DatastoreConfig {
    pub(crate) api_root: String,
    pub(crate) project: String,
    pub(crate) namespace: Option<String>,
    pub(crate) token: SharedTokenSource,
    pub(crate) timeout: Option<Duration>,
}

impl DatastoreConfig {
    pub fn builder(project: impl Into<String>) -> DatastoreConfigBuilder {
        DatastoreConfigBuilder::new(project)
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `{root}/projects/{project}:{method}`
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!("{}/projects/{}:{}", self.api_root, self.project, method)
    }
}

impl fmt::Debug for DatastoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatastoreConfig")
            .field("api_root", &self.api_root)
            .field("project", &self.project)
            .field("namespace", &self.namespace)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct DatastoreConfigBuilder {
    project: String,
    api_root: Option<String>,
    namespace: Option<String>,
    token: Option<SharedTokenSource>,
    timeout: Option<Duration>,
}

impl DatastoreConfigBuilder {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            api_root: None,
            namespace: None,
            token: None,
            timeout: None,
        }
    }

    /// Override the API root (trailing `/` is trimmed).
    pub fn api_root(mut self, url: &str) -> Self {
        self.api_root = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Namespace applied to queries.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
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

    /// Per-call timeout (default: the session default of 10s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the configuration.
    ///
    /// Without an explicit root, `DATASTORE_EMULATOR_HOST` selects the emulator
    /// and drops the token; otherwise the public API is used.
    pub fn build(self) -> Result<DatastoreConfig, Error> {
        if self.project.trim().is_empty() {
            return Err(Error::Validation("project cannot be empty".to_string()));
        }

        let emulator = match self.api_root {
            Some(_) => None,
            None => network::emulator_host(network::DATASTORE_EMULATOR_HOST),
        };

        let (api_root, token): (String, SharedTokenSource) = match (self.api_root, emulator) {
            (Some(root), _) => (root, self.token.unwrap_or_else(|| Arc::new(Anonymous))),
            (None, Some(host)) => {
                tracing::debug!(host = %host, "using Datastore emulator");
                (network::datastore_emulator_root(&host), Arc::new(Anonymous))
            }
            (None, None) => (
                network::DATASTORE_API_ROOT.to_string(),
                self.token.unwrap_or_else(|| Arc::new(Anonymous)),
            ),
        };

        Ok(DatastoreConfig {
            api_root,
            project: self.project,
            namespace: self.namespace,
            token,
            timeout: self.timeout,
        })
    }
}
