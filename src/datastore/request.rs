//! Request bodies shared by the async and blocking Datastore clients.

use super::query::QueryInput;
use super::{wire, DatastoreConfig, ExportOptions, Key, Mutation, ReadConsistency};
use crate::error::Error;
use crate::http::Payload;

/// Every key must name at least one path element with a kind.
pub(crate) fn validate_keys(keys: &[Key]) -> Result<(), Error> {
    for key in keys {
        if key.path.is_empty() || key.path.iter().any(|p| p.kind.is_empty()) {
            return Err(Error::Validation(format!("key has no kind: {:?}", key)));
        }
    }
    Ok(())
}

fn wire_keys(keys: &[Key]) -> Vec<wire::Key> {
    keys.iter().map(Into::into).collect()
}

pub(crate) fn read_options(transaction: Option<&str>, consistency: ReadConsistency) -> wire::ReadOptions {
    match transaction {
        Some(t) => wire::ReadOptions {
            read_consistency: None,
            transaction: Some(t.to_string()),
        },
        None => wire::ReadOptions {
            read_consistency: Some(consistency),
            transaction: None,
        },
    }
}

pub(crate) fn keys_body(keys: &[Key]) -> Result<Payload, Error> {
    validate_keys(keys)?;
    Ok(Payload::json(&wire::KeysRequest {
        keys: wire_keys(keys),
    })?)
}

pub(crate) fn begin_transaction_body() -> Payload {
    Payload::Text("{}".to_string())
}

pub(crate) fn transaction_body(transaction: &str) -> Result<Payload, Error> {
    if transaction.is_empty() {
        return Err(Error::Validation("transaction cannot be empty".to_string()));
    }
    Ok(Payload::json(&wire::TransactionRequest {
        transaction: transaction.to_string(),
    })?)
}

pub(crate) fn commit_body(mutations: &[Mutation], transaction: Option<&str>) -> Result<Payload, Error> {
    let mode = if transaction.is_some() {
        super::CommitMode::Transactional
    } else {
        super::CommitMode::NonTransactional
    };
    Ok(Payload::json(&wire::CommitRequest {
        mode,
        mutations: mutations.iter().map(Into::into).collect(),
        transaction: transaction.map(str::to_string),
    })?)
}

pub(crate) fn lookup_body(
    keys: &[Key],
    transaction: Option<&str>,
    consistency: ReadConsistency,
) -> Result<Payload, Error> {
    validate_keys(keys)?;
    Ok(Payload::json(&wire::LookupRequest {
        keys: wire_keys(keys),
        read_options: read_options(transaction, consistency),
    })?)
}

pub(crate) fn run_query_body(
    config: &DatastoreConfig,
    query: &QueryInput,
    transaction: Option<&str>,
    consistency: ReadConsistency,
) -> Result<Payload, Error> {
    let (query, gql_query): (Option<wire::Query>, Option<wire::GqlQuery>) = match query {
        QueryInput::Structured(q) => (Some(q.into()), None),
        QueryInput::Gql(q) => (None, Some(q.into())),
    };
    Ok(Payload::json(&wire::RunQueryRequest {
        partition_id: wire::PartitionId {
            project_id: Some(config.project.clone()),
            namespace_id: config.namespace.clone(),
        },
        read_options: read_options(transaction, consistency),
        query,
        gql_query,
    })?)
}

pub(crate) fn export_body(bucket: &str, options: &ExportOptions) -> Result<Payload, Error> {
    let bucket = bucket.trim_start_matches("gs://").trim_end_matches('/');
    if bucket.is_empty() {
        return Err(Error::Validation("export bucket cannot be empty".to_string()));
    }
    let output_url_prefix = match &options.prefix {
        Some(prefix) => format!("gs://{}/{}", bucket, prefix.trim_start_matches('/')),
        None => format!("gs://{}", bucket),
    };
    Ok(Payload::json(&wire::ExportRequest {
        output_url_prefix,
        entity_filter: wire::EntityFilter {
            kinds: options.kinds.clone(),
            namespace_ids: options.namespaces.clone(),
        },
        labels: options.labels.clone(),
    })?)
}

/// `{root}/{operation_name}`; accepts the full `projects/.../operations/...` name.
pub(crate) fn operation_url(config: &DatastoreConfig, name: &str) -> Result<String, Error> {
    let name = name.trim_start_matches('/');
    if name.is_empty() {
        return Err(Error::Validation("operation name cannot be empty".to_string()));
    }
    Ok(format!("{}/{}", config.api_root, name))
}
