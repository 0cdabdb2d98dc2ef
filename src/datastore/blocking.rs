//! Blocking Datastore client over any [`Session`].
//!
//! Same surface as the async [`Datastore`](super::client::Datastore) without `async`.

use serde::de::DeserializeOwned;

use super::query::QueryInput;
use super::{
    request, wire, CommitResult, DatastoreConfig, DatastoreOperation, ExportOptions, Key,
    LookupResult, Mutation, Operation, Properties, QueryResultBatch, ReadConsistency,
};
use crate::auth;
use crate::error::{Error, HttpError};
use crate::http::{Payload, Session, SyncSession};
use crate::shared::decode_json;

/// Blocking Datastore client.
pub struct Datastore<S = SyncSession> {
    config: DatastoreConfig,
    session: S,
}

impl Datastore<SyncSession> {
    pub fn new(project: impl Into<String>) -> Result<Self, Error> {
        let config = DatastoreConfig::builder(project).build()?;
        Ok(Self::with_session(config, SyncSession::new()))
    }
}

impl<S: Session> Datastore<S> {
    pub fn with_session(config: DatastoreConfig, session: S) -> Self {
        Self { config, session }
    }

    pub fn config(&self) -> &DatastoreConfig {
        &self.config
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn allocate_ids(&self, keys: &[Key]) -> Result<Vec<Key>, Error> {
        let resp: wire::AllocateIdsResponse = self.call("allocateIds", request::keys_body(keys)?)?;
        Ok(resp.keys.into_iter().map(Into::into).collect())
    }

    pub fn reserve_ids(&self, keys: &[Key]) -> Result<(), Error> {
        let _: serde_json::Value = self.call("reserveIds", request::keys_body(keys)?)?;
        Ok(())
    }

    pub fn begin_transaction(&self) -> Result<String, Error> {
        let resp: wire::BeginTransactionResponse =
            self.call("beginTransaction", request::begin_transaction_body())?;
        Ok(resp.transaction)
    }

    pub fn commit(
        &self,
        mutations: Vec<Mutation>,
        transaction: Option<&str>,
    ) -> Result<CommitResult, Error> {
        let resp: wire::CommitResponse =
            self.call("commit", request::commit_body(&mutations, transaction)?)?;
        Ok(resp.into())
    }

    pub fn rollback(&self, transaction: &str) -> Result<(), Error> {
        let _: serde_json::Value = self.call("rollback", request::transaction_body(transaction)?)?;
        Ok(())
    }

    pub fn lookup(
        &self,
        keys: &[Key],
        transaction: Option<&str>,
        consistency: ReadConsistency,
    ) -> Result<LookupResult, Error> {
        let resp: wire::LookupResponse =
            self.call("lookup", request::lookup_body(keys, transaction, consistency)?)?;
        resp.try_into()
    }

    pub fn run_query(
        &self,
        query: impl Into<QueryInput>,
        transaction: Option<&str>,
        consistency: ReadConsistency,
    ) -> Result<QueryResultBatch, Error> {
        let body = request::run_query_body(&self.config, &query.into(), transaction, consistency)?;
        let resp: wire::RunQueryResponse = self.call("runQuery", body)?;
        resp.batch.try_into()
    }

    pub fn insert(&self, key: Key, properties: Properties) -> Result<CommitResult, Error> {
        self.mutate(Operation::Insert, key, Some(properties))
    }

    pub fn update(&self, key: Key, properties: Properties) -> Result<CommitResult, Error> {
        self.mutate(Operation::Update, key, Some(properties))
    }

    pub fn upsert(&self, key: Key, properties: Properties) -> Result<CommitResult, Error> {
        self.mutate(Operation::Upsert, key, Some(properties))
    }

    pub fn delete(&self, key: Key) -> Result<CommitResult, Error> {
        self.mutate(Operation::Delete, key, None)
    }

    pub fn make_mutation(operation: Operation, key: Key, properties: Option<Properties>) -> Mutation {
        Mutation::new(operation, key, properties)
    }

    fn mutate(
        &self,
        operation: Operation,
        key: Key,
        properties: Option<Properties>,
    ) -> Result<CommitResult, Error> {
        request::validate_keys(std::slice::from_ref(&key))?;
        self.commit(vec![Mutation::new(operation, key, properties)], None)
    }

    pub fn export(&self, bucket: &str, options: &ExportOptions) -> Result<DatastoreOperation, Error> {
        self.call("export", request::export_body(bucket, options)?)
    }

    pub fn get_datastore_operation(&self, name: &str) -> Result<DatastoreOperation, Error> {
        let url = request::operation_url(&self.config, name)?;
        let headers = auth::json_headers(self.config.token.as_ref());
        let resp = self.session.get(&url, &headers, self.config.timeout, None)?;
        decode_json(&resp.bytes().map_err(HttpError::from)?)
    }

    fn call<T: DeserializeOwned>(&self, method: &str, body: Payload) -> Result<T, Error> {
        let url = self.config.method_url(method);
        let headers = auth::json_headers(self.config.token.as_ref());
        let resp = self
            .session
            .post(&url, &headers, body, self.config.timeout, None)?;
        decode_json(&resp.bytes().map_err(HttpError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::PathElement;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> Datastore {
        let config = DatastoreConfig::builder("proj")
            .api_root(&server.url("/v1"))
            .build()
            .unwrap();
        Datastore::with_session(config, SyncSession::new())
    }

    #[test]
    fn test_begin_transaction_posts_empty_object() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/projects/proj:beginTransaction")
                .header("content-type", "application/json")
                .json_body(json!({}));
            then.status(200).json_body(json!({"transaction": "tx-1"}));
        });

        assert_eq!(client(&server).begin_transaction().unwrap(), "tx-1");
        mock.assert();
    }

    #[test]
    fn test_rollback_status_error_surfaces() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/projects/proj:rollback");
            then.status(400).body("bad transaction");
        });

        let err = client(&server).rollback("tx-1").unwrap_err();
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_delete_sends_single_non_transactional_mutation() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/projects/proj:commit")
                .json_body(json!({
                    "mode": "NON_TRANSACTIONAL",
                    "mutations": [{"delete": {
                        "partitionId": {"projectId": "proj"},
                        "path": [{"kind": "K", "name": "a"}]
                    }}]
                }));
            then.status(200).json_body(json!({
                "mutationResults": [{"version": "7"}],
                "indexUpdates": 1
            }));
        });

        let key = Key::new("proj", vec![PathElement::with_name("K", "a")]);
        let result = client(&server).delete(key).unwrap();
        mock.assert();
        assert_eq!(result.index_updates, 1);
        assert_eq!(result.mutation_results[0].version, Some(7));
    }

    #[test]
    fn test_lookup_invalid_int64_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/projects/proj:lookup");
            then.status(200).json_body(json!({
                "found": [{"entity": {"properties": {"n": {"integerValue": "abc"}}}}]
            }));
        });

        let key = Key::new("proj", vec![PathElement::with_id("K", 1)]);
        let err = client(&server)
            .lookup(&[key], None, ReadConsistency::Strong)
            .unwrap_err();
        match err {
            Error::Decode(msg) => assert!(msg.contains("invalid int64"), "{msg}"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_client_over_borrowed_session() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/projects/proj:beginTransaction");
            then.status(200).json_body(json!({"transaction": "tx-2"}));
        });

        let session = SyncSession::new();
        let config = DatastoreConfig::builder("proj")
            .api_root(&server.url("/v1"))
            .build()
            .unwrap();
        let first = Datastore::with_session(config.clone(), &session);
        let second = Datastore::with_session(config, &session);
        assert_eq!(first.begin_transaction().unwrap(), "tx-2");
        assert_eq!(second.begin_transaction().unwrap(), "tx-2");
        mock.assert_hits(2);
        assert!(std::sync::Arc::ptr_eq(
            &first.session().ensure_pool().unwrap(),
            &second.session().ensure_pool().unwrap()
        ));
    }
}
