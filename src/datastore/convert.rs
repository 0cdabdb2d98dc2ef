//! Domain ↔ wire conversions.
//!
//! Domain → wire is infallible. Wire → domain can fail on malformed base64
//! blobs and timestamps; those surface as [`Error::Decode`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};

use super::query::{Filter, GqlParameter, GqlQuery, Query};
use super::{
    wire, CommitResult, Entity, EntityResult, Key, LookupResult, Mutation, MutationResult,
    PathElement, QueryResultBatch, Value,
};
use crate::error::Error;

// ─── Keys ────────────────────────────────────────────────────────────────────

impl From<&PathElement> for wire::PathElement {
    fn from(p: &PathElement) -> Self {
        Self {
            kind: p.kind.clone(),
            id: p.id,
            name: p.name.clone(),
        }
    }
}

impl From<wire::PathElement> for PathElement {
    fn from(p: wire::PathElement) -> Self {
        Self {
            kind: p.kind,
            id: p.id,
            name: p.name,
        }
    }
}

impl From<&Key> for wire::Key {
    fn from(k: &Key) -> Self {
        Self {
            partition_id: Some(wire::PartitionId {
                project_id: Some(k.project.clone()),
                namespace_id: k.namespace.clone(),
            }),
            path: k.path.iter().map(Into::into).collect(),
        }
    }
}

impl From<wire::Key> for Key {
    fn from(k: wire::Key) -> Self {
        let partition = k.partition_id.unwrap_or_default();
        Self {
            project: partition.project_id.unwrap_or_default(),
            namespace: partition.namespace_id.filter(|ns| !ns.is_empty()),
            path: k.path.into_iter().map(Into::into).collect(),
        }
    }
}

// ─── Values ──────────────────────────────────────────────────────────────────

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Decode(format!("invalid timestamp {:?}: {}", s, e)))
}

impl From<&Value> for wire::Value {
    fn from(v: &Value) -> Self {
        let mut out = wire::Value::default();
        match v {
            Value::Null => out.null_value = Some(serde_json::Value::Null),
            Value::Boolean(b) => out.boolean_value = Some(*b),
            Value::Integer(i) => out.integer_value = Some(*i),
            Value::Double(d) => out.double_value = Some(*d),
            Value::Timestamp(ts) => out.timestamp_value = Some(format_timestamp(ts)),
            Value::Key(k) => out.key_value = Some(k.into()),
            Value::String(s) => out.string_value = Some(s.clone()),
            Value::Blob(b) => out.blob_value = Some(BASE64.encode(b)),
            Value::GeoPoint(g) => out.geo_point_value = Some(*g),
            Value::Entity(e) => out.entity_value = Some(e.into()),
            Value::Array(values) => {
                out.array_value = Some(wire::ArrayValue {
                    values: values.iter().map(Into::into).collect(),
                })
            }
        }
        out
    }
}

impl TryFrom<wire::Value> for Value {
    type Error = Error;

    fn try_from(v: wire::Value) -> Result<Self, Error> {
        if v.null_value.is_some() {
            return Ok(Value::Null);
        }
        if let Some(b) = v.boolean_value {
            return Ok(Value::Boolean(b));
        }
        if let Some(i) = v.integer_value {
            return Ok(Value::Integer(i));
        }
        if let Some(d) = v.double_value {
            return Ok(Value::Double(d));
        }
        if let Some(ts) = v.timestamp_value {
            return parse_timestamp(&ts).map(Value::Timestamp);
        }
        if let Some(k) = v.key_value {
            return Ok(Value::Key(k.into()));
        }
        if let Some(s) = v.string_value {
            return Ok(Value::String(s));
        }
        if let Some(b) = v.blob_value {
            return BASE64
                .decode(b.as_bytes())
                .map(Value::Blob)
                .map_err(|e| Error::Decode(format!("invalid blob: {}", e)));
        }
        if let Some(g) = v.geo_point_value {
            return Ok(Value::GeoPoint(g));
        }
        if let Some(e) = v.entity_value {
            return Entity::try_from(e).map(Value::Entity);
        }
        if let Some(a) = v.array_value {
            return a
                .values
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array);
        }
        // Unknown or absent type tag.
        Ok(Value::Null)
    }
}

// ─── Entities ────────────────────────────────────────────────────────────────

impl From<&Entity> for wire::Entity {
    fn from(e: &Entity) -> Self {
        let properties = e
            .properties
            .iter()
            .map(|(name, value)| {
                let mut w = wire::Value::from(value);
                if e.unindexed.contains(name) {
                    w.exclude_from_indexes = Some(true);
                }
                (name.clone(), w)
            })
            .collect();
        Self {
            key: e.key.as_ref().map(Into::into),
            properties,
        }
    }
}

impl TryFrom<wire::Entity> for Entity {
    type Error = Error;

    fn try_from(e: wire::Entity) -> Result<Self, Error> {
        let mut entity = Entity {
            key: e.key.map(Into::into),
            ..Entity::default()
        };
        for (name, value) in e.properties {
            if value.exclude_from_indexes == Some(true) {
                entity.unindexed.insert(name.clone());
            }
            entity.properties.insert(name, value.try_into()?);
        }
        Ok(entity)
    }
}

impl TryFrom<wire::EntityResult> for EntityResult {
    type Error = Error;

    fn try_from(r: wire::EntityResult) -> Result<Self, Error> {
        Ok(Self {
            entity: r.entity.try_into()?,
            version: r.version,
            cursor: r.cursor,
        })
    }
}

fn entity_results(results: Vec<wire::EntityResult>) -> Result<Vec<EntityResult>, Error> {
    results.into_iter().map(EntityResult::try_from).collect()
}

// ─── Mutations & responses ───────────────────────────────────────────────────

impl From<&Mutation> for wire::Mutation {
    fn from(m: &Mutation) -> Self {
        match m {
            Mutation::Insert(e) => Self {
                insert: Some(e.into()),
                ..Self::default()
            },
            Mutation::Update(e) => Self {
                update: Some(e.into()),
                ..Self::default()
            },
            Mutation::Upsert(e) => Self {
                upsert: Some(e.into()),
                ..Self::default()
            },
            Mutation::Delete(k) => Self {
                delete: Some(k.into()),
                ..Self::default()
            },
        }
    }
}

impl From<wire::CommitResponse> for CommitResult {
    fn from(r: wire::CommitResponse) -> Self {
        Self {
            mutation_results: r
                .mutation_results
                .into_iter()
                .map(|m| MutationResult {
                    key: m.key.map(Into::into),
                    version: m.version,
                    conflict_detected: m.conflict_detected.unwrap_or(false),
                })
                .collect(),
            index_updates: r.index_updates.unwrap_or(0),
        }
    }
}

impl TryFrom<wire::LookupResponse> for LookupResult {
    type Error = Error;

    fn try_from(r: wire::LookupResponse) -> Result<Self, Error> {
        Ok(Self {
            found: entity_results(r.found)?,
            missing: entity_results(r.missing)?,
            deferred: r.deferred.into_iter().map(Into::into).collect(),
        })
    }
}

impl TryFrom<wire::QueryResultBatch> for QueryResultBatch {
    type Error = Error;

    fn try_from(b: wire::QueryResultBatch) -> Result<Self, Error> {
        Ok(Self {
            entity_result_type: b.entity_result_type,
            entity_results: entity_results(b.entity_results)?,
            end_cursor: b.end_cursor,
            more_results: b.more_results,
            skipped_results: b.skipped_results.unwrap_or(0),
            skipped_cursor: b.skipped_cursor,
            snapshot_version: b.snapshot_version,
        })
    }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

fn property(name: &str) -> wire::PropertyReference {
    wire::PropertyReference {
        name: name.to_string(),
    }
}

impl From<&Filter> for wire::Filter {
    fn from(f: &Filter) -> Self {
        match f {
            Filter::Property(p) => Self {
                composite_filter: None,
                property_filter: Some(wire::PropertyFilter {
                    property: property(&p.property),
                    op: p.op,
                    value: (&p.value).into(),
                }),
            },
            Filter::Composite(c) => Self {
                composite_filter: Some(wire::CompositeFilter {
                    op: c.op,
                    filters: c.filters.iter().map(Into::into).collect(),
                }),
                property_filter: None,
            },
        }
    }
}

impl From<&Query> for wire::Query {
    fn from(q: &Query) -> Self {
        Self {
            kind: q
                .kind
                .iter()
                .map(|k| wire::KindExpression { name: k.clone() })
                .collect(),
            filter: q.filter.as_ref().map(Into::into),
            order: q
                .order
                .iter()
                .map(|o| wire::PropertyOrder {
                    property: property(&o.property),
                    direction: o.direction,
                })
                .collect(),
            projection: q
                .projection
                .iter()
                .map(|p| wire::Projection {
                    property: property(&p.0),
                })
                .collect(),
            distinct_on: q.distinct_on.iter().map(|d| property(d)).collect(),
            start_cursor: q.start_cursor.clone(),
            end_cursor: q.end_cursor.clone(),
            offset: q.offset,
            limit: q.limit,
        }
    }
}

impl From<&GqlParameter> for wire::GqlQueryParameter {
    fn from(p: &GqlParameter) -> Self {
        match p {
            GqlParameter::Value(v) => Self {
                value: Some(v.into()),
                cursor: None,
            },
            GqlParameter::Cursor(c) => Self {
                value: None,
                cursor: Some(c.clone()),
            },
        }
    }
}

impl From<&GqlQuery> for wire::GqlQuery {
    fn from(q: &GqlQuery) -> Self {
        Self {
            query_string: q.query_string.clone(),
            allow_literals: q.allow_literals,
            named_bindings: q
                .named_bindings
                .iter()
                .map(|(name, p)| (name.clone(), p.into()))
                .collect(),
            positional_bindings: q.positional_bindings.iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::query::{PropertyFilter, PropertyFilterOperator, Projection};
    use crate::datastore::{LatLng, Properties, ResultType};
    use chrono::TimeZone;
    use serde_json::json;

    fn key() -> Key {
        Key::new("proj", vec![PathElement::with_name("Animal", "sloth")]).in_namespace("zoo")
    }

    #[test]
    fn test_key_to_wire_json() {
        let json = serde_json::to_value(wire::Key::from(&key())).unwrap();
        assert_eq!(
            json,
            json!({
                "partitionId": {"projectId": "proj", "namespaceId": "zoo"},
                "path": [{"kind": "Animal", "name": "sloth"}]
            })
        );
    }

    #[test]
    fn test_key_from_wire_drops_empty_namespace() {
        let w: wire::Key = serde_json::from_value(json!({
            "partitionId": {"projectId": "proj", "namespaceId": ""},
            "path": [{"kind": "Animal", "id": "12"}]
        }))
        .unwrap();
        let k = Key::from(w);
        assert_eq!(k.namespace, None);
        assert_eq!(k.path, vec![PathElement::with_id("Animal", 12)]);
    }

    #[test]
    fn test_value_json_shapes() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let cases = vec![
            (Value::Null, json!({"nullValue": null})),
            (Value::Integer(42), json!({"integerValue": "42"})),
            (Value::Boolean(true), json!({"booleanValue": true})),
            (Value::Timestamp(ts), json!({"timestampValue": "2024-01-15T10:30:00Z"})),
            (Value::Blob(b"hi".to_vec()), json!({"blobValue": "aGk="})),
            (
                Value::GeoPoint(LatLng { latitude: 1.5, longitude: -2.0 }),
                json!({"geoPointValue": {"latitude": 1.5, "longitude": -2.0}}),
            ),
            (
                Value::Array(vec![Value::from("a"), Value::from(1i64)]),
                json!({"arrayValue": {"values": [{"stringValue": "a"}, {"integerValue": "1"}]}}),
            ),
        ];
        for (value, expected) in cases {
            let w = wire::Value::from(&value);
            assert_eq!(serde_json::to_value(&w).unwrap(), expected, "{:?}", value);
            let back = Value::try_from(serde_json::from_value::<wire::Value>(expected).unwrap()).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_bad_blob_is_decode_error() {
        let w: wire::Value = serde_json::from_value(json!({"blobValue": "!!!"})).unwrap();
        assert!(matches!(Value::try_from(w), Err(Error::Decode(_))));
    }

    #[test]
    fn test_bad_timestamp_is_decode_error() {
        let w: wire::Value = serde_json::from_value(json!({"timestampValue": "yesterday"})).unwrap();
        assert!(matches!(Value::try_from(w), Err(Error::Decode(_))));
    }

    #[test]
    fn test_entity_unindexed_round_trip() {
        let mut props = Properties::new();
        props.insert("bio".into(), Value::from("long text"));
        props.insert("age".into(), Value::from(3i64));
        let entity = Entity::new(key(), props).exclude_from_indexes("bio");

        let w = wire::Entity::from(&entity);
        assert_eq!(w.properties["bio"].exclude_from_indexes, Some(true));
        assert_eq!(w.properties["age"].exclude_from_indexes, None);

        let back = Entity::try_from(w).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_query_to_wire_json() {
        let q = Query::kind("Animal")
            .filter(PropertyFilter::new("value", PropertyFilterOperator::Equal, 30i64))
            .projection(vec![Projection::key()])
            .distinct_on(vec!["dist_value".into()])
            .limit(1);
        let json = serde_json::to_value(wire::Query::from(&q)).unwrap();
        assert_eq!(
            json,
            json!({
                "kind": [{"name": "Animal"}],
                "filter": {"propertyFilter": {
                    "property": {"name": "value"},
                    "op": "EQUAL",
                    "value": {"integerValue": "30"}
                }},
                "projection": [{"property": {"name": "__key__"}}],
                "distinctOn": [{"name": "dist_value"}],
                "limit": 1
            })
        );
    }

    #[test]
    fn test_composite_filter_to_wire_json() {
        let f = Filter::and(vec![
            PropertyFilter::new("a", PropertyFilterOperator::GreaterThan, 1i64).into(),
            PropertyFilter::new("b", PropertyFilterOperator::NotEqual, "x").into(),
        ]);
        let json = serde_json::to_value(wire::Filter::from(&f)).unwrap();
        assert_eq!(json["compositeFilter"]["op"], "AND");
        assert_eq!(json["compositeFilter"]["filters"][1]["propertyFilter"]["op"], "NOT_EQUAL");
    }

    #[test]
    fn test_gql_to_wire_json() {
        let q = GqlQuery::new("SELECT * FROM Animal WHERE value = @value").bind("value", 42i64);
        let json = serde_json::to_value(wire::GqlQuery::from(&q)).unwrap();
        assert_eq!(
            json,
            json!({
                "queryString": "SELECT * FROM Animal WHERE value = @value",
                "allowLiterals": false,
                "namedBindings": {"value": {"value": {"integerValue": "42"}}}
            })
        );
    }

    #[test]
    fn test_query_batch_from_wire() {
        let w: wire::RunQueryResponse = serde_json::from_value(json!({
            "batch": {
                "entityResultType": "KEY_ONLY",
                "entityResults": [{
                    "entity": {"key": {"partitionId": {"projectId": "proj"}, "path": [{"kind": "Animal", "id": "1"}]}},
                    "cursor": "CgA="
                }],
                "endCursor": "CgA=",
                "moreResults": "MORE_RESULTS_AFTER_LIMIT"
            }
        }))
        .unwrap();
        let batch = QueryResultBatch::try_from(w.batch).unwrap();
        assert_eq!(batch.entity_result_type, ResultType::KeyOnly);
        assert_eq!(batch.entity_results.len(), 1);
        assert!(batch.entity_results[0].entity.properties.is_empty());
        assert_eq!(batch.skipped_results, 0);
    }
}
