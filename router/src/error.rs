//! Runtime error taxonomy.
//!
//! Static errors (`SchemaError`, `ProjectionError`, `TransformError`) are
//! fatal at load time: the router never starts serving. Protocol violations
//! are recoverable only under the `recover` policy; transport failures are
//! always fatal, since the protocol cannot make progress without its peers.

use switchboard_types::{ParticipantId, ValueType};
use thiserror::Error;

/// A runtime deviation from the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// A message arrived after the machine reached its end state.
    #[error("received message from {sender} but the protocol is already finalised")]
    Finished { sender: ParticipantId },

    /// The message came from the wrong participant.
    #[error("received message from {got}, expected to receive message from {expected}")]
    UnexpectedSender {
        got: ParticipantId,
        expected: ParticipantId,
    },

    /// A label was expected but the payload is not a string.
    #[error("the received message from {sender} does not contain a label")]
    NotALabel { sender: ParticipantId },

    /// The label is not one of the current state's branches.
    #[error("the received message from {sender} contains an unknown label {label}")]
    UnknownLabel {
        sender: ParticipantId,
        label: String,
    },

    /// The payload's runtime type does not match the expected value type.
    #[error("the received message from {sender} contains a {got}, while the router expected a {expected}")]
    PayloadType {
        sender: ParticipantId,
        got: &'static str,
        expected: ValueType,
    },

    /// The wrapped party addressed a message to someone other than the hop
    /// the synthesized plan prescribes.
    #[error("the received message is intended for {got}, while the message had to be sent to {expected}")]
    UnexpectedRecipient {
        got: ParticipantId,
        expected: ParticipantId,
    },
}

/// Anything that can take a router down.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Static scoping error in the protocol description.
    #[error(transparent)]
    Schema(#[from] switchboard_compiler::SchemaError),

    /// The protocol is not relatively well-formed.
    #[error(transparent)]
    Projection(#[from] switchboard_compiler::ProjectionError),

    /// The synthesized process could not be linked.
    #[error(transparent)]
    Transform(#[from] switchboard_fsm::TransformError),

    /// The runtime message sequence deviated from the protocol.
    #[error("{0}\nPROTOCOL VIOLATION")]
    Violation(#[from] ProtocolViolation),

    /// A peer or the wrapped party stayed unreachable after retries.
    #[error("error occurred when communicating with {peer}")]
    Transport {
        peer: ParticipantId,
        #[source]
        source: reqwest::Error,
    },

    /// The wrapped party did not answer its startup liveness probe.
    #[error("implementing party {party} did not answer its liveness probe at {address}")]
    PartyUnreachable { party: ParticipantId, address: String },

    /// The synthesized machine is missing a transition it is guaranteed to
    /// have by construction.
    #[error("malformed router machine: {0}")]
    MalformedMachine(&'static str),

    /// No address registered for a participant the machine routes to.
    #[error("no address registered for participant {0}")]
    UnknownParticipant(ParticipantId),

    /// The protocol description file could not be read.
    #[error("failed to read protocol description at {path}")]
    ReadProtocol {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The protocol description file could not be parsed.
    #[error("failed to parse protocol description at {path}")]
    ParseProtocol {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
