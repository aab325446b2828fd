//! The wire envelope spoken between routers and wrapped parties.
//!
//! Every protocol message is a `POST /` with a JSON body of the shape
//! `{ "sender": ..., "receiver": ..., "payload": ... }` where the payload is a
//! string, number, or boolean. Response bodies are always empty; only the
//! state transition matters.

use crate::{ParticipantId, ValueType};
use serde::{Deserialize, Serialize};

/// A protocol message payload: a branch label or a typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
}

impl Payload {
    /// The label carried by this payload, if it is a string.
    #[must_use]
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the payload's runtime type satisfies an expected value type.
    ///
    /// `real` accepts any number; `int` only integers. `unit` expects no
    /// value message at all, so nothing satisfies it.
    #[must_use]
    pub fn matches(&self, expected: ValueType) -> bool {
        match (expected, self) {
            (ValueType::Str, Payload::String(_)) => true,
            (ValueType::Int, Payload::Int(_)) => true,
            (ValueType::Bool, Payload::Bool(_)) => true,
            (ValueType::Real, Payload::Int(_) | Payload::Real(_)) => true,
            _ => false,
        }
    }

    /// Human-readable name of the payload's runtime type, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Bool(_) => "boolean",
            Payload::Int(_) => "integer",
            Payload::Real(_) => "number",
            Payload::String(_) => "string",
        }
    }
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Bool(b) => write!(f, "{}", b),
            Payload::Int(i) => write!(f, "{}", i),
            Payload::Real(r) => write!(f, "{}", r),
            Payload::String(s) => write!(f, "{}", s),
        }
    }
}

/// One protocol message as carried over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub sender: ParticipantId,
    pub receiver: ParticipantId,
    pub payload: Payload,
}

impl Envelope {
    /// Create an envelope
    #[must_use]
    pub fn new(
        sender: impl Into<ParticipantId>,
        receiver: impl Into<ParticipantId>,
        payload: Payload,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            payload,
        }
    }

    /// The same payload re-addressed to a dependency of the implementing party.
    #[must_use]
    pub fn readdress(
        &self,
        sender: impl Into<ParticipantId>,
        receiver: impl Into<ParticipantId>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            payload: self.payload.clone(),
        }
    }
}
