//! Async Datastore client over any [`AsyncSession`].

use serde::de::DeserializeOwned;

use super::query::QueryInput;
use super::{
    request, wire, CommitResult, DatastoreConfig, DatastoreOperation, ExportOptions, Key,
    LookupResult, Mutation, Operation, Properties, QueryResultBatch, ReadConsistency,
};
use crate::auth;
use crate::error::{Error, HttpError};
use crate::http::{AioSession, AsyncSession, Payload};
use crate::shared::decode_json;

/// Async Datastore client.
///
/// ```rust,ignore
/// let ds = Datastore::new("my-project")?;
/// let keys = ds.allocate_ids(&[Key::new("my-project", vec![PathElement::new("Animal")])]).await?;
/// ds.insert(keys[0].clone(), props).await?;
/// ```
pub struct Datastore<S = AioSession> {
    config: DatastoreConfig,
    session: S,
}

impl Datastore<AioSession> {
    /// Client for `project` with default configuration and a fresh session.
    pub fn new(project: impl Into<String>) -> Result<Self, Error> {
        let config = DatastoreConfig::builder(project).build()?;
        Ok(Self::with_session(config, AioSession::default()))
    }
}

impl<S: AsyncSession> Datastore<S> {
    pub fn with_session(config: DatastoreConfig, session: S) -> Self {
        Self { config, session }
    }

    pub fn config(&self) -> &DatastoreConfig {
        &self.config
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    // ── Keys ─────────────────────────────────────────────────────────────

    /// Allocate ids for incomplete keys.
    pub async fn allocate_ids(&self, keys: &[Key]) -> Result<Vec<Key>, Error> {
        let resp: wire::AllocateIdsResponse =
            self.call("allocateIds", request::keys_body(keys)?).await?;
        Ok(resp.keys.into_iter().map(Into::into).collect())
    }

    /// Prevent the given complete keys from being auto-allocated.
    pub async fn reserve_ids(&self, keys: &[Key]) -> Result<(), Error> {
        let _: serde_json::Value = self.call("reserveIds", request::keys_body(keys)?).await?;
        Ok(())
    }

    // ── Transactions ─────────────────────────────────────────────────────

    pub async fn begin_transaction(&self) -> Result<String, Error> {
        let resp: wire::BeginTransactionResponse = self
            .call("beginTransaction", request::begin_transaction_body())
            .await?;
        Ok(resp.transaction)
    }

    /// Commit mutations, inside `transaction` when given.
    pub async fn commit(
        &self,
        mutations: Vec<Mutation>,
        transaction: Option<&str>,
    ) -> Result<CommitResult, Error> {
        let resp: wire::CommitResponse = self
            .call("commit", request::commit_body(&mutations, transaction)?)
            .await?;
        Ok(resp.into())
    }

    pub async fn rollback(&self, transaction: &str) -> Result<(), Error> {
        let _: serde_json::Value = self
            .call("rollback", request::transaction_body(transaction)?)
            .await?;
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub async fn lookup(
        &self,
        keys: &[Key],
        transaction: Option<&str>,
        consistency: ReadConsistency,
    ) -> Result<LookupResult, Error> {
        let resp: wire::LookupResponse = self
            .call("lookup", request::lookup_body(keys, transaction, consistency)?)
            .await?;
        resp.try_into()
    }

    pub async fn run_query(
        &self,
        query: impl Into<QueryInput>,
        transaction: Option<&str>,
        consistency: ReadConsistency,
    ) -> Result<QueryResultBatch, Error> {
        let body = request::run_query_body(&self.config, &query.into(), transaction, consistency)?;
        let resp: wire::RunQueryResponse = self.call("runQuery", body).await?;
        resp.batch.try_into()
    }

    // ── Single-entity writes ─────────────────────────────────────────────

    pub async fn insert(&self, key: Key, properties: Properties) -> Result<CommitResult, Error> {
        self.mutate(Operation::Insert, key, Some(properties)).await
    }

    pub async fn update(&self, key: Key, properties: Properties) -> Result<CommitResult, Error> {
        self.mutate(Operation::Update, key, Some(properties)).await
    }

    pub async fn upsert(&self, key: Key, properties: Properties) -> Result<CommitResult, Error> {
        self.mutate(Operation::Upsert, key, Some(properties)).await
    }

    pub async fn delete(&self, key: Key) -> Result<CommitResult, Error> {
        self.mutate(Operation::Delete, key, None).await
    }

    /// Build a mutation for [`commit`](Self::commit).
    pub fn make_mutation(operation: Operation, key: Key, properties: Option<Properties>) -> Mutation {
        Mutation::new(operation, key, properties)
    }

    async fn mutate(
        &self,
        operation: Operation,
        key: Key,
        properties: Option<Properties>,
    ) -> Result<CommitResult, Error> {
        request::validate_keys(std::slice::from_ref(&key))?;
        self.commit(vec![Mutation::new(operation, key, properties)], None)
            .await
    }

    // ── Admin ────────────────────────────────────────────────────────────

    /// Start a managed export into `bucket`.
    pub async fn export(
        &self,
        bucket: &str,
        options: &ExportOptions,
    ) -> Result<DatastoreOperation, Error> {
        self.call("export", request::export_body(bucket, options)?)
            .await
    }

    /// Poll a long-running operation by its full name.
    pub async fn get_datastore_operation(&self, name: &str) -> Result<DatastoreOperation, Error> {
        let url = request::operation_url(&self.config, name)?;
        let headers = auth::json_headers(self.config.token.as_ref());
        let resp = self
            .session
            .get(&url, &headers, self.config.timeout, None)
            .await?;
        decode_json(&resp.bytes().await.map_err(HttpError::from)?)
    }

    // ── Internal ─────────────────────────────────────────────────────────

    /// POST `projects/{project}:{method}` and parse the JSON answer.
    async fn call<T: DeserializeOwned>(&self, method: &str, body: Payload) -> Result<T, Error> {
        let url = self.config.method_url(method);
        let headers = auth::json_headers(self.config.token.as_ref());
        let resp = self
            .session
            .post(&url, &headers, body, self.config.timeout, None)
            .await?;
        decode_json(&resp.bytes().await.map_err(HttpError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::PathElement;

    #[test]
    fn test_make_mutation_delete_ignores_properties() {
        let key = Key::new("p", vec![PathElement::with_id("K", 1)]);
        let m = Datastore::<AioSession>::make_mutation(Operation::Delete, key.clone(), Some(Properties::new()));
        assert_eq!(m, Mutation::Delete(key));
    }

    #[tokio::test]
    async fn test_invalid_key_fails_before_sending() {
        let config = DatastoreConfig::builder("p")
            .api_root("http://127.0.0.1:1/v1")
            .build()
            .unwrap();
        let ds = Datastore::with_session(config, AioSession::default());
        let err = ds.insert(Key::new("p", vec![]), Properties::new()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(!ds.session().has_pool());
    }
}
