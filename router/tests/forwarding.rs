//! Delivery behaviour against live local endpoints: retries on transient
//! failure, fatal transport errors, and dependency fan-out.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use switchboard_fsm::transform;
use switchboard_router::{Forwarder, Outcome, RetryPolicy, RouterContext, RouterError};
use switchboard_types::{Envelope, ParticipantId, Payload, RouterProcess};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

fn capture_app(seen: Arc<Mutex<Vec<Envelope>>>) -> Router {
    Router::new().route(
        "/",
        post(move |Json(envelope): Json<Envelope>| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(envelope);
                StatusCode::OK
            }
        }),
    )
}

fn quick_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        delay_unit: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn delivery_succeeds_after_transient_failures() {
    let hits = Arc::new(AtomicU32::new(0));
    let app = Router::new().route(
        "/",
        post({
            let hits = hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                        StatusCode::SERVICE_UNAVAILABLE
                    } else {
                        StatusCode::OK
                    }
                }
            }
        }),
    );
    let url = serve(app).await;

    let forwarder = Forwarder::new(quick_retry()).unwrap();
    let envelope = Envelope::new("c", "s", Payload::String("login".into()));
    forwarder.post_envelope("s", &url, &envelope).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn delivery_fails_once_retries_are_exhausted() {
    let hits = Arc::new(AtomicU32::new(0));
    let app = Router::new().route(
        "/",
        post({
            let hits = hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }
        }),
    );
    let url = serve(app).await;

    let forwarder = Forwarder::new(quick_retry()).unwrap();
    let envelope = Envelope::new("c", "s", Payload::String("login".into()));
    let err = forwarder.post_envelope("s", &url, &envelope).await.unwrap_err();
    assert_matches!(err, RouterError::Transport { peer, .. } => assert_eq!(peer, "s"));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn forwards_to_receiver_and_dependencies_concurrently() {
    let to_party = Arc::new(Mutex::new(Vec::new()));
    let to_dep = Arc::new(Mutex::new(Vec::new()));
    let party_url = serve(capture_app(to_party.clone())).await;
    let dep_url = serve(capture_app(to_dep.clone())).await;

    // The router of s relays c's label to s and forwards a copy to a,
    // which cannot otherwise learn which branch was taken
    let process = RouterProcess::receive_label(
        "c",
        [(
            "login".to_string(),
            RouterProcess::send("s", vec!["a".to_string()], RouterProcess::End),
        )],
    );
    let machine = transform("s", &process).unwrap();
    let participants: IndexMap<ParticipantId, String> = [
        ("c".to_string(), "http://127.0.0.1:1".to_string()),
        ("s".to_string(), party_url),
        ("a".to_string(), dep_url),
    ]
    .into_iter()
    .collect();
    let mut ctx = RouterContext::new(
        machine,
        participants,
        "s".to_string(),
        Forwarder::new(quick_retry()).unwrap(),
    );

    let outcome = ctx
        .message_received(&Envelope::new("c", "s", Payload::String("login".into())))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Finished);

    // Both deliveries were awaited before Finished was reported
    let party_seen = to_party.lock().unwrap();
    assert_eq!(
        *party_seen,
        [Envelope::new("c", "s", Payload::String("login".into()))]
    );
    let dep_seen = to_dep.lock().unwrap();
    assert_eq!(
        *dep_seen,
        [Envelope::new("s", "a", Payload::String("login".into()))]
    );
}

#[tokio::test]
async fn state_advances_after_a_retried_forward() {
    // The receiver fails the first two deliveries; the third succeeds, so
    // processing must complete normally instead of terminating early.
    let hits = Arc::new(AtomicU32::new(0));
    let app = Router::new().route(
        "/",
        post({
            let hits = hits.clone();
            move || {
                let hits = hits.clone();
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                        StatusCode::SERVICE_UNAVAILABLE
                    } else {
                        StatusCode::OK
                    }
                }
            }
        }),
    );
    let party_url = serve(app).await;

    let process = RouterProcess::receive_label(
        "c",
        [(
            "login".to_string(),
            RouterProcess::send("s", vec![], RouterProcess::End),
        )],
    );
    let machine = transform("s", &process).unwrap();
    let participants: IndexMap<ParticipantId, String> = [
        ("c".to_string(), "http://127.0.0.1:1".to_string()),
        ("s".to_string(), party_url),
    ]
    .into_iter()
    .collect();
    let mut ctx = RouterContext::new(
        machine,
        participants,
        "s".to_string(),
        Forwarder::new(quick_retry()).unwrap(),
    );

    let outcome = ctx
        .message_received(&Envelope::new("c", "s", Payload::String("login".into())))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Finished);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unreachable_receiver_is_a_transport_error() {
    let process = RouterProcess::receive_label(
        "c",
        [(
            "login".to_string(),
            RouterProcess::send("s", vec![], RouterProcess::End),
        )],
    );
    let machine = transform("s", &process).unwrap();
    let participants: IndexMap<ParticipantId, String> = [
        ("c".to_string(), "http://127.0.0.1:1".to_string()),
        ("s".to_string(), "http://127.0.0.1:1".to_string()),
    ]
    .into_iter()
    .collect();
    let mut ctx = RouterContext::new(
        machine,
        participants,
        "s".to_string(),
        Forwarder::new(RetryPolicy {
            max_attempts: 2,
            delay_unit: Duration::from_millis(1),
        })
        .unwrap(),
    );

    let err = ctx
        .message_received(&Envelope::new("c", "s", Payload::String("login".into())))
        .await
        .unwrap_err();
    assert_matches!(err, RouterError::Transport { peer, .. } => assert_eq!(peer, "s"));
}
