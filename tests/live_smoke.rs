//! Smoke tests against the real services (or their emulators).
//!
//! All tests are `#[ignore]` because they need a project and credentials.
//! Configure through the environment or a `.env` file:
//!
//! - `GCLOUD_PROJECT`: project id
//! - `GCLOUD_ACCESS_TOKEN`: OAuth access token (omit for emulators)
//! - `DATASTORE_KIND`: kind used for test entities
//!
//! Run with:
//! ```bash
//! cargo test --test live_smoke -- --ignored
//! ```

use std::env;
use std::sync::Arc;

use gcloud_rest::auth::{Anonymous, StaticToken, TokenSource};
use gcloud_rest::datastore::{
    blocking, Datastore, DatastoreConfig, Filter, GqlQuery, Key, Operation, PathElement,
    Projection, Properties, PropertyFilter, PropertyFilterOperator, Query, ReadConsistency,
    ResultType, Value,
};
use gcloud_rest::http::{AioSession, SyncSession};

struct Env {
    project: String,
    kind: String,
    token: Arc<dyn TokenSource>,
}

fn env() -> Env {
    let _ = dotenvy::dotenv();
    let project = env::var("GCLOUD_PROJECT").expect("GCLOUD_PROJECT must be set");
    let kind = env::var("DATASTORE_KIND").unwrap_or_else(|_| "PublicTestDatastoreModel".to_string());
    let token: Arc<dyn TokenSource> = match env::var("GCLOUD_ACCESS_TOKEN") {
        Ok(t) if !t.is_empty() => Arc::new(StaticToken::new(t)),
        _ => Arc::new(Anonymous),
    };
    Env { project, kind, token }
}

fn datastore(env: &Env) -> Datastore {
    let config = DatastoreConfig::builder(env.project.as_str())
        .shared_token(env.token.clone())
        .build()
        .expect("config");
    Datastore::with_session(config, AioSession::default())
}

fn props(pairs: &[(&str, Value)]) -> Properties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[tokio::test]
#[ignore]
async fn item_lifecycle() {
    let env = env();
    let ds = datastore(&env);
    let key = Key::new(env.project.as_str(), vec![PathElement::new(env.kind.as_str())]);

    let allocated = ds.allocate_ids(&[key.clone()]).await.unwrap();
    assert_eq!(allocated.len(), 1);
    let mut expected = key;
    expected.path[0].id = allocated[0].path[0].id;
    assert_eq!(expected, allocated[0]);
    let key = allocated[0].clone();

    ds.reserve_ids(&allocated).await.unwrap();

    let inserted = props(&[("is_this_bad_data", true.into())]);
    ds.insert(key.clone(), inserted.clone()).await.unwrap();
    let actual = ds.lookup(&[key.clone()], None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(actual.found[0].entity.properties, inserted);

    let updated = props(&[("animal", "aardvark".into()), ("overwrote_bad_data", true.into())]);
    ds.update(key.clone(), updated.clone()).await.unwrap();
    let actual = ds.lookup(&[key.clone()], None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(actual.found[0].entity.properties, updated);

    let upserted = props(&[("meaning_of_life", 42i64.into())]);
    ds.upsert(key.clone(), upserted.clone()).await.unwrap();
    let actual = ds.lookup(&[key.clone()], None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(actual.found[0].entity.properties, upserted);

    ds.delete(key.clone()).await.unwrap();
    let actual = ds.lookup(&[key], None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(actual.missing.len(), 1);
}

#[tokio::test]
#[ignore]
async fn transaction() {
    let env = env();
    let ds = datastore(&env);
    let name = format!("test_record_{}", uuid::Uuid::new_v4());
    let key = Key::new(env.project.as_str(), vec![PathElement::with_name(env.kind.as_str(), name)]);

    let tx = ds.begin_transaction().await.unwrap();
    let actual = ds.lookup(&[key.clone()], Some(&tx), ReadConsistency::Strong).await.unwrap();
    assert_eq!(actual.missing.len(), 1);

    let mutations = vec![
        Datastore::<AioSession>::make_mutation(
            Operation::Insert,
            key.clone(),
            Some(props(&[("animal", "three-toed sloth".into())])),
        ),
        Datastore::<AioSession>::make_mutation(
            Operation::Update,
            key.clone(),
            Some(props(&[("animal", "aardvark".into())])),
        ),
    ];
    ds.commit(mutations, Some(&tx)).await.unwrap();

    let actual = ds.lookup(&[key.clone()], None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(actual.found[0].entity.properties, props(&[("animal", "aardvark".into())]));

    ds.delete(key).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn rollback() {
    let env = env();
    let ds = datastore(&env);
    let tx = ds.begin_transaction().await.unwrap();
    ds.rollback(&tx).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn query_with_key_projection() {
    let env = env();
    let ds = datastore(&env);
    ds.insert(
        Key::new(env.project.as_str(), vec![PathElement::new(env.kind.as_str())]),
        props(&[("value", 30i64.into())]),
    )
    .await
    .unwrap();

    let query = Query::kind(env.kind.as_str())
        .filter(Filter::from(PropertyFilter::new(
            "value",
            PropertyFilterOperator::Equal,
            30i64,
        )))
        .projection(vec![Projection::key()])
        .limit(1);
    let result = ds.run_query(query, None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(result.entity_result_type, ResultType::KeyOnly);
    let entity = &result.entity_results[0].entity;
    assert!(entity.properties.is_empty());

    ds.delete(entity.key.clone().unwrap()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn query_with_value_projection() {
    let env = env();
    let ds = datastore(&env);
    ds.insert(
        Key::new(env.project.as_str(), vec![PathElement::new(env.kind.as_str())]),
        props(&[("value", 30i64.into())]),
    )
    .await
    .unwrap();

    let query = Query::kind(env.kind.as_str())
        .filter(Filter::from(PropertyFilter::new(
            "value",
            PropertyFilterOperator::Equal,
            30i64,
        )))
        .projection(vec![Projection::new("value")])
        .limit(1);
    let result = ds.run_query(query, None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(result.entity_result_type, ResultType::Projection);
    let entity = &result.entity_results[0].entity;
    assert_eq!(entity.get("value").and_then(Value::as_i64), Some(30));

    ds.delete(entity.key.clone().unwrap()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn query_with_distinct_on() {
    let env = env();
    let ds = datastore(&env);
    let incomplete: Vec<Key> = (0..3)
        .map(|_| Key::new(env.project.as_str(), vec![PathElement::new(env.kind.as_str())]))
        .collect();

    let first = ds.allocate_ids(&incomplete).await.unwrap();
    let second = ds.allocate_ids(&incomplete).await.unwrap();
    for key in &first {
        ds.insert(key.clone(), props(&[("dist_value", 11i64.into())])).await.unwrap();
    }
    for key in &second {
        ds.insert(key.clone(), props(&[("dist_value", 22i64.into())])).await.unwrap();
    }

    let query = Query::kind(env.kind.as_str())
        .distinct_on(vec!["dist_value".into()])
        .limit(10);
    let result = ds.run_query(query, None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(result.entity_results.len(), 2);

    for key in first.into_iter().chain(second) {
        ds.delete(key).await.unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn gql_query_counts_new_entities() {
    let env = env();
    let ds = datastore(&env);
    let gql = || {
        GqlQuery::new(format!("SELECT * FROM {} WHERE value = @value", env.kind)).bind("value", 42i64)
    };

    let before = ds.run_query(gql(), None, ReadConsistency::Strong).await.unwrap();

    let tx = ds.begin_transaction().await.unwrap();
    let mutations = (0..3)
        .map(|_| {
            Datastore::<AioSession>::make_mutation(
                Operation::Insert,
                Key::new(env.project.as_str(), vec![PathElement::new(env.kind.as_str())]),
                Some(props(&[("value", 42i64.into())])),
            )
        })
        .collect();
    let committed = ds.commit(mutations, Some(&tx)).await.unwrap();

    let after = ds.run_query(gql(), None, ReadConsistency::Strong).await.unwrap();
    assert_eq!(after.entity_results.len(), before.entity_results.len() + 3);

    for result in committed.mutation_results {
        if let Some(key) = result.key {
            ds.delete(key).await.unwrap();
        }
    }
}

#[test]
#[ignore]
fn blocking_rollback() {
    let env = env();
    let config = DatastoreConfig::builder(env.project.as_str())
        .shared_token(env.token.clone())
        .build()
        .unwrap();
    let ds = blocking::Datastore::with_session(config, SyncSession::new());
    let tx = ds.begin_transaction().unwrap();
    ds.rollback(&tx).unwrap();
}
