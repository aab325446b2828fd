//! The HTTP surface of a router.
//!
//! Three endpoints: `POST /` carries protocol messages, `GET /api/alive`
//! answers peer liveness probes, and `POST /api/violation` receives abort
//! notices from other routers. Every response body is empty; the protocol
//! state itself is the only thing the exchange moves.
//!
//! Message handling holds the context lock for the full
//! validate-advance-forward sequence, so concurrent posts are applied one
//! at a time in arrival order.

use crate::config::ViolationPolicy;
use crate::context::{Outcome, RouterContext};
use crate::forward::Forwarder;
use crate::RouterError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use switchboard_types::{Envelope, ParticipantId};
use tracing::{error, warn};

/// Shared state behind the HTTP handlers.
pub struct AppState {
    context: Mutex<RouterContext>,
    policy: ViolationPolicy,
    forwarder: Forwarder,
    participants: IndexMap<ParticipantId, String>,
    party_online: AtomicBool,
    network_online: AtomicBool,
    violation_pending: AtomicBool,
    shutdown: mpsc::Sender<i32>,
}

impl AppState {
    /// Assemble the shared state. The shutdown sender carries the process
    /// exit code; the first value sent wins.
    pub fn new(
        context: RouterContext,
        policy: ViolationPolicy,
        forwarder: Forwarder,
        participants: IndexMap<ParticipantId, String>,
        shutdown: mpsc::Sender<i32>,
    ) -> Self {
        Self {
            context: Mutex::new(context),
            policy,
            forwarder,
            participants,
            party_online: AtomicBool::new(false),
            network_online: AtomicBool::new(false),
            violation_pending: AtomicBool::new(false),
            shutdown,
        }
    }

    /// Start answering liveness probes with 200.
    pub fn mark_party_online(&self) {
        self.party_online.store(true, Ordering::SeqCst);
    }

    /// Open the gate for protocol messages.
    pub fn mark_network_online(&self) {
        self.network_online.store(true, Ordering::SeqCst);
    }

    fn request_shutdown(&self, code: i32) {
        // A full channel means a shutdown is already in flight
        let _ = self.shutdown.try_send(code);
    }

    /// Notify every other router and the wrapped party that the protocol
    /// has been violated. Best effort; undeliverable notices are logged.
    async fn broadcast_violation(&self) {
        futures::future::join_all(
            self.participants
                .iter()
                .map(|(peer, address)| self.forwarder.post_violation(peer, address)),
        )
        .await;
    }
}

/// Build the router's HTTP application.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(receive_message))
        .route("/api/alive", get(alive))
        .route("/api/violation", post(violation_notice))
        .with_state(state)
}

/// `POST /`: one protocol message.
async fn receive_message(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<Envelope>,
) -> StatusCode {
    if !state.network_online.load(Ordering::SeqCst) {
        warn!(sender = %envelope.sender, "message dropped, network not yet online");
        return StatusCode::OK;
    }
    if state.violation_pending.load(Ordering::SeqCst) {
        warn!(sender = %envelope.sender, "message ignored, violation pending");
        return StatusCode::OK;
    }

    let mut context = state.context.lock().await;
    match context.message_received(&envelope).await {
        Ok(Outcome::Continue) => {}
        Ok(Outcome::Finished) => state.request_shutdown(0),
        Err(RouterError::Violation(violation)) => {
            error!("{}\nPROTOCOL VIOLATION", violation);
            match state.policy {
                ViolationPolicy::Abort => {
                    state.violation_pending.store(true, Ordering::SeqCst);
                    state.broadcast_violation().await;
                    state.request_shutdown(1);
                }
                ViolationPolicy::Recover => {
                    warn!("recovering, protocol state rolled back to the last receive");
                    context.recover();
                }
            }
        }
        Err(error) => {
            error!(%error, "message handling failed, shutting down");
            state.request_shutdown(1);
        }
    }
    StatusCode::OK
}

/// `GET /api/alive`: 200 once the wrapped party has answered its probe.
async fn alive(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.party_online.load(Ordering::SeqCst) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// `POST /api/violation`: a peer router detected a violation; terminate.
async fn violation_notice(State(state): State<Arc<AppState>>) -> StatusCode {
    error!("received violation notice from a peer router, terminating");
    state.violation_pending.store(true, Ordering::SeqCst);
    state.request_shutdown(1);
    StatusCode::OK
}
