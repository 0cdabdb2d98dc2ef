//! Cloud Storage: object and bucket metadata, listing, media transfer.
//!
//! `client.rs` is the async client, `blocking.rs` its blocking twin; both share
//! URL and header construction from `request.rs`.

pub mod config;
pub mod request;

#[cfg(feature = "aio")]
pub mod client;

#[cfg(feature = "blocking")]
pub mod blocking;

pub use config::{StorageConfig, StorageConfigBuilder};

#[cfg(feature = "aio")]
pub use client::Storage;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::serde_util::opt_int64;

/// Payloads larger than this go through a resumable upload session.
pub const RESUMABLE_UPLOAD_THRESHOLD: usize = 5 * 1024 * 1024;

/// Object resource as returned by the JSON API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(default, with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub metageneration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crc32c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// User-supplied key/value metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// One page of `list_objects`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsResponse {
    #[serde(default)]
    pub items: Vec<ObjectMetadata>,
    /// Common prefixes when listing with a `delimiter`.
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Bucket resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub storage_class: Option<String>,
    #[serde(default, with = "opt_int64")]
    pub project_number: Option<i64>,
    #[serde(default, with = "opt_int64")]
    pub metageneration: Option<i64>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}
