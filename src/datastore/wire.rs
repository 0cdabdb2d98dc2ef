//! Wire types for the Datastore v1 REST API (camelCase JSON).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::query::{CompositeOperator, Direction, PropertyFilterOperator};
use super::{CommitMode, LatLng, MoreResults, ReadConsistency, ResultType};
use crate::shared::serde_util::{self, opt_int64};

// ─── Keys, values, entities ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathElement {
    pub kind: String,
    #[serde(default, with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<PartitionId>,
    #[serde(default)]
    pub path: Vec<PathElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

/// A value: exactly one of the `*Value` fields is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_from_indexes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<i32>,
    #[serde(
        default,
        deserialize_with = "serde_util::deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub null_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(default, with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_value: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// Base64-encoded bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_point_value: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_value: Option<Entity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_value: Option<ArrayValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    #[serde(default)]
    pub entity: Entity,
    #[serde(default, with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct KeysRequest {
    pub keys: Vec<Key>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    pub transaction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upsert: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Key>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitRequest {
    pub mode: CommitMode,
    pub mutations: Vec<Mutation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_consistency: Option<ReadConsistency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    pub keys: Vec<Key>,
    pub read_options: ReadOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyReference {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindExpression {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyFilter {
    pub property: PropertyReference,
    pub op: PropertyFilterOperator,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeFilter {
    pub op: CompositeOperator,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_filter: Option<CompositeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_filter: Option<PropertyFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyOrder {
    pub property: PropertyReference,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub property: PropertyReference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kind: Vec<KindExpression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<PropertyOrder>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projection: Vec<Projection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distinct_on: Vec<PropertyReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GqlQueryParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlQuery {
    pub query_string: String,
    pub allow_literals: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub named_bindings: BTreeMap<String, GqlQueryParameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub positional_bindings: Vec<GqlQueryParameter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub partition_id: PartitionId,
    pub read_options: ReadOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gql_query: Option<GqlQuery>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespace_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub output_url_prefix: String,
    pub entity_filter: EntityFilter,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocateIdsResponse {
    #[serde(default)]
    pub keys: Vec<Key>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeginTransactionResponse {
    pub transaction: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    #[serde(default)]
    pub key: Option<Key>,
    #[serde(default, with = "opt_int64")]
    pub version: Option<i64>,
    #[serde(default)]
    pub conflict_detected: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    #[serde(default)]
    pub mutation_results: Vec<MutationResult>,
    #[serde(default)]
    pub index_updates: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub found: Vec<EntityResult>,
    #[serde(default)]
    pub missing: Vec<EntityResult>,
    #[serde(default)]
    pub deferred: Vec<Key>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultBatch {
    #[serde(default)]
    pub skipped_results: Option<i32>,
    #[serde(default)]
    pub skipped_cursor: Option<String>,
    #[serde(default)]
    pub entity_result_type: ResultType,
    #[serde(default)]
    pub entity_results: Vec<EntityResult>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub more_results: MoreResults,
    #[serde(default, with = "opt_int64")]
    pub snapshot_version: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunQueryResponse {
    #[serde(default)]
    pub batch: QueryResultBatch,
}
