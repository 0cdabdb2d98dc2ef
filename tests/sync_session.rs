//! Blocking session against a local mock server.
//!
//! ```bash
//! cargo test --test sync_session
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use httpmock::prelude::*;
use reqwest::header::{HeaderMap, HeaderValue};

use gcloud_rest::error::HttpError;
use gcloud_rest::http::{Headers, Params, Payload, Session, SyncSession};

fn no_headers() -> Headers {
    HashMap::new()
}

#[test]
fn get_returns_body_on_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/ok").query_param("q", "1");
        then.status(200).body("fine");
    });

    let session = SyncSession::new();
    let params = Params::from([("q".to_string(), "1".to_string())]);
    let resp = session
        .get(&server.url("/ok"), &no_headers(), None, Some(&params))
        .unwrap();
    assert_eq!(resp.text().unwrap(), "fine");
    mock.assert();
}

#[test]
fn non_success_status_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("not here");
    });
    server.mock(|when, then| {
        when.method(POST).path("/broken");
        then.status(500).body("boom");
    });

    let session = SyncSession::new();

    let err = session
        .get(&server.url("/missing"), &no_headers(), None, None)
        .unwrap_err();
    assert!(err.is_not_found());
    match err {
        HttpError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not here");
        }
        other => panic!("expected status error, got {:?}", other),
    }

    let err = session
        .post(&server.url("/broken"), &no_headers(), Payload::from("x"), None, None)
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[test]
fn every_verb_sends_headers_and_body() {
    let server = MockServer::start();
    let post = server.mock(|when, then| {
        when.method(POST)
            .path("/items")
            .header("x-test", "yes")
            .body("payload");
        then.status(201);
    });
    let put = server.mock(|when, then| {
        when.method(PUT).path("/items/1").body_contains("bytes");
        then.status(200);
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/items/1").query_param("force", "true");
        then.status(204);
    });

    let session = SyncSession::new();
    let headers = Headers::from([("x-test".to_string(), "yes".to_string())]);
    session
        .post(&server.url("/items"), &headers, "payload".into(), None, None)
        .unwrap();
    session
        .put(&server.url("/items/1"), &headers, b"bytes".as_slice().into(), None)
        .unwrap();
    let params = Params::from([("force".to_string(), "true".to_string())]);
    session
        .delete(&server.url("/items/1"), &headers, Some(&params), None)
        .unwrap();

    post.assert();
    put.assert();
    delete.assert();
}

#[test]
fn pool_is_reused_across_requests() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/ping");
        then.status(200);
    });

    let session = SyncSession::new();
    session.get(&server.url("/ping"), &no_headers(), None, None).unwrap();
    let first = session.ensure_pool().unwrap();
    session.get(&server.url("/ping"), &no_headers(), None, None).unwrap();
    let second = session.ensure_pool().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    mock.assert_hits(2);
}

#[test]
fn injected_pool_is_used() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/who").header("x-pool", "injected");
        then.status(200);
    });

    let mut defaults = HeaderMap::new();
    defaults.insert("x-pool", HeaderValue::from_static("injected"));
    let pool = Arc::new(
        reqwest::blocking::Client::builder()
            .default_headers(defaults)
            .build()
            .unwrap(),
    );

    let session = SyncSession::new();
    session.set_pool(pool.clone());
    session.get(&server.url("/who"), &no_headers(), None, None).unwrap();

    assert!(Arc::ptr_eq(&session.ensure_pool().unwrap(), &pool));
    mock.assert();
}

#[test]
fn shared_handle_across_threads() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/shared");
        then.status(200).delay(Duration::from_millis(20));
    });

    let session = Arc::new(SyncSession::new());
    let url = server.url("/shared");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let session = session.clone();
            let url = url.clone();
            thread::spawn(move || session.get(&url, &HashMap::new(), None, None).map(|r| r.status()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 200);
    }
    mock.assert_hits(4);
}

#[test]
fn one_handle_serializes_requests() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/serial");
        then.status(200).delay(Duration::from_millis(300));
    });

    let session = Arc::new(SyncSession::new());
    let url = server.url("/serial");
    let started = Instant::now();
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let session = session.clone();
            let url = url.clone();
            thread::spawn(move || session.get(&url, &no_headers(), None, None).map(|r| r.status()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 200);
    }

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(600), "requests overlapped: {:?}", elapsed);
    mock.assert_hits(2);
}

#[test]
fn per_call_timeout_is_honoured() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200).delay(Duration::from_millis(500));
    });

    let session = SyncSession::new();
    let err = session
        .get(&server.url("/slow"), &no_headers(), Some(Duration::from_millis(50)), None)
        .unwrap_err();
    match err {
        HttpError::Reqwest(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}
