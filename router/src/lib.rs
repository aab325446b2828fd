//! The protocol-enforcing router runtime.
//!
//! A router wraps one protocol participant. At startup it compiles the
//! shared protocol description into a state machine for its party, waits
//! behind a liveness barrier until the whole network is up, and then relays
//! every message its party sends or receives, checking each one against the
//! machine. Well-behaved traffic flows through unchanged (plus any
//! dependency forwards the protocol requires); deviating traffic trips a
//! violation and, under the default policy, takes the whole network down
//! with it.

pub mod config;
pub mod context;
mod error;
pub mod forward;
pub mod liveness;
pub mod server;

pub use config::{load_protocol, RouterOptions, ViolationPolicy};
pub use context::{Outcome, RouterContext};
pub use error::{ProtocolViolation, RouterError};
pub use forward::{Forwarder, RetryPolicy};
pub use server::{app, AppState};
