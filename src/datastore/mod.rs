//! Cloud Datastore keys, entities, values, mutations and query results.
//!
//! - `mod.rs`: domain types used by callers
//! - `query.rs`: structured and GQL queries
//! - `wire.rs`: serde structs matching the REST JSON
//! - `convert.rs`: domain ↔ wire conversions
//! - `config.rs`: endpoint configuration
//! - `request.rs`: request bodies shared by both client flavours
//! - `client.rs` / `blocking.rs`: async and blocking clients

pub mod config;
pub mod convert;
pub mod query;
pub mod request;
pub mod wire;

#[cfg(feature = "aio")]
pub mod client;

#[cfg(feature = "blocking")]
pub mod blocking;

pub use config::{DatastoreConfig, DatastoreConfigBuilder};
pub use query::{
    CompositeFilter, CompositeOperator, Direction, Filter, GqlParameter, GqlQuery, Projection,
    PropertyFilter, PropertyFilterOperator, PropertyOrder, Query, QueryInput,
};

#[cfg(feature = "aio")]
pub use client::Datastore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Entity properties, name → value.
pub type Properties = BTreeMap<String, Value>;

// ─── Keys ────────────────────────────────────────────────────────────────────

/// One `(kind, id | name)` step of a key path.
///
/// With neither `id` nor `name` the element is incomplete; the service assigns
/// an id on insert or `allocate_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathElement {
    pub kind: String,
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl PathElement {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            name: None,
        }
    }

    pub fn with_id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id),
            name: None,
        }
    }

    pub fn with_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            name: Some(name.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.id.is_some() || self.name.is_some()
    }
}

/// A Datastore key: partition plus ancestor path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub project: String,
    pub namespace: Option<String>,
    pub path: Vec<PathElement>,
}

impl Key {
    pub fn new(project: impl Into<String>, path: Vec<PathElement>) -> Self {
        Self {
            project: project.into(),
            namespace: None,
            path,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Kind of the last path element.
    pub fn kind(&self) -> Option<&str> {
        self.path.last().map(|p| p.kind.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.path.last().map(PathElement::is_complete).unwrap_or(false)
    }
}

// ─── Values & entities ───────────────────────────────────────────────────────

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    Key(Key),
    String(String),
    Blob(Vec<u8>),
    GeoPoint(LatLng),
    Entity(Entity),
    Array(Vec<Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Key> for Value {
    fn from(v: Key) -> Self {
        Value::Key(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<LatLng> for Value {
    fn from(v: LatLng) -> Self {
        Value::GeoPoint(v)
    }
}

impl From<Entity> for Value {
    fn from(v: Entity) -> Self {
        Value::Entity(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// An entity: optional key plus named properties.
///
/// Property names in `unindexed` are written with `excludeFromIndexes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub key: Option<Key>,
    pub properties: Properties,
    pub unindexed: BTreeSet<String>,
}

impl Entity {
    pub fn new(key: Key, properties: Properties) -> Self {
        Self {
            key: Some(key),
            properties,
            unindexed: BTreeSet::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Mark a property as excluded from indexes.
    pub fn exclude_from_indexes(mut self, name: impl Into<String>) -> Self {
        self.unindexed.insert(name.into());
        self
    }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// An entity returned by lookup or query.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityResult {
    pub entity: Entity,
    pub version: Option<i64>,
    pub cursor: Option<String>,
}

/// How much of each entity a query returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    Full,
    Projection,
    KeyOnly,
    #[default]
    #[serde(other)]
    ResultTypeUnspecified,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResultTypeUnspecified => "RESULT_TYPE_UNSPECIFIED",
            Self::Full => "FULL",
            Self::Projection => "PROJECTION",
            Self::KeyOnly => "KEY_ONLY",
        }
    }
}

/// Whether a query batch is the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoreResults {
    NotFinished,
    MoreResultsAfterLimit,
    MoreResultsAfterCursor,
    NoMoreResults,
    #[default]
    #[serde(other)]
    MoreResultsTypeUnspecified,
}

/// One batch of query results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResultBatch {
    pub entity_result_type: ResultType,
    pub entity_results: Vec<EntityResult>,
    pub end_cursor: Option<String>,
    pub more_results: MoreResults,
    pub skipped_results: i32,
    pub skipped_cursor: Option<String>,
    pub snapshot_version: Option<i64>,
}

/// Result of `lookup`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LookupResult {
    pub found: Vec<EntityResult>,
    pub missing: Vec<EntityResult>,
    pub deferred: Vec<Key>,
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// Kind of write a mutation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Upsert,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
        }
    }
}

/// A single write within a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Insert(Entity),
    Update(Entity),
    Upsert(Entity),
    Delete(Key),
}

impl Mutation {
    /// Build a mutation; `properties` is ignored for `Delete`.
    pub fn new(operation: Operation, key: Key, properties: Option<Properties>) -> Self {
        let entity = || Entity::new(key.clone(), properties.clone().unwrap_or_default());
        match operation {
            Operation::Insert => Mutation::Insert(entity()),
            Operation::Update => Mutation::Update(entity()),
            Operation::Upsert => Mutation::Upsert(entity()),
            Operation::Delete => Mutation::Delete(key.clone()),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Insert(_) => Operation::Insert,
            Mutation::Update(_) => Operation::Update,
            Mutation::Upsert(_) => Operation::Upsert,
            Mutation::Delete(_) => Operation::Delete,
        }
    }
}

/// Outcome of one mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationResult {
    /// Set when the mutation's key was incomplete and got allocated.
    pub key: Option<Key>,
    pub version: Option<i64>,
    pub conflict_detected: bool,
}

/// Result of `commit`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommitResult {
    pub mutation_results: Vec<MutationResult>,
    pub index_updates: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitMode {
    Transactional,
    NonTransactional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadConsistency {
    #[default]
    Strong,
    Eventual,
}

// ─── Admin ───────────────────────────────────────────────────────────────────

/// A long-running admin operation (export).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatastoreOperation {
    pub name: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

impl DatastoreOperation {
    /// `metadata.common.state`, e.g. `"PROCESSING"` or `"SUCCESSFUL"`.
    pub fn state(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("common")?.get("state")?.as_str()
    }

    /// `metadata.outputUrlPrefix` of an export.
    pub fn output_url_prefix(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("outputUrlPrefix")?.as_str()
    }
}

/// What `export` writes and where.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    /// Object prefix inside the bucket; the service picks one when `None`.
    pub prefix: Option<String>,
    pub kinds: Vec<String>,
    pub namespaces: Vec<String>,
    pub labels: BTreeMap<String, String>,
}
