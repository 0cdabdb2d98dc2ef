//! # gcloud-rest
//!
//! Thin clients for the Google Cloud Datastore and Storage REST APIs, built on
//! an HTTP session layer that comes in a blocking and a non-blocking flavour.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: errors, URL constants, serde helpers
//! 2. **Auth**: bearer tokens via [`auth::TokenSource`]
//! 3. **Session**: [`http::SyncSession`] (blocking) and [`http::AioSession`] (async)
//! 4. **APIs**: [`datastore`] and [`storage`], each with an async client and a
//!    blocking twin generic over the matching session trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gcloud_rest::prelude::*;
//!
//! let config = DatastoreConfig::builder("my-project")
//!     .token(StaticToken::new(access_token))
//!     .build()?;
//! let ds = Datastore::with_session(config, AioSession::default());
//! let tx = ds.begin_transaction().await?;
//! ds.rollback(&tx).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Error types for sessions and API clients.
pub mod error;

/// Service roots and emulator discovery.
pub mod network;

/// Serde helpers and URL encoding.
pub mod shared;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

pub mod auth;

// ── Layer 3: Session ─────────────────────────────────────────────────────────

pub mod http;

// ── Layer 4: APIs ────────────────────────────────────────────────────────────

pub mod datastore;

pub mod storage;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Errors
    pub use crate::error::{Error, HttpError};

    // Auth
    pub use crate::auth::{Anonymous, StaticToken, TokenSource};

    // Sessions
    pub use crate::http::{Headers, Params, Payload, DEFAULT_TIMEOUT_SECS};
    #[cfg(feature = "aio")]
    pub use crate::http::{AioSession, AsyncSession};
    #[cfg(feature = "blocking")]
    pub use crate::http::{Session, SyncSession};

    // Datastore
    pub use crate::datastore::{
        CommitResult, DatastoreConfig, Entity, EntityResult, ExportOptions, Filter, GqlQuery,
        Key, LatLng, LookupResult, Mutation, Operation, PathElement, Properties, PropertyFilter,
        PropertyFilterOperator, PropertyOrder, Query, QueryResultBatch, ReadConsistency, Value,
    };
    #[cfg(feature = "aio")]
    pub use crate::datastore::Datastore;

    // Storage
    pub use crate::storage::{BucketMetadata, ListObjectsResponse, ObjectMetadata, StorageConfig};
    #[cfg(feature = "aio")]
    pub use crate::storage::Storage;
}
