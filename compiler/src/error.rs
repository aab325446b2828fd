//! Errors raised by the static pipeline.

use switchboard_types::ParticipantId;
use thiserror::Error;

/// Static scoping and naming errors in a global type.
///
/// All of these are fatal at load time; a router never starts serving a
/// protocol that fails the checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An exchange names a participant missing from the participant table.
    #[error("undefined sender or receiver for exchange {sender} -> {receiver}")]
    UndefinedParticipant {
        sender: ParticipantId,
        receiver: ParticipantId,
    },

    /// A recursive call references a variable with no enclosing definition.
    #[error("recursive call to undefined variable {0}")]
    UnboundVariable(String),

    /// A recursion definition shadows a variable still in scope.
    #[error("redefinition of recursion on variable {0}")]
    RedefinedVariable(String),
}

/// Errors raised while computing relative projections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// Neither member of the pair touches a diverging exchange: the protocol
    /// has no defined relative type for this pair.
    #[error(
        "undefined relative type for ({p}, {q}): neither participates in the \
         diverging exchange {sender} -> {receiver}"
    )]
    UndefinedRelativeType {
        p: ParticipantId,
        q: ParticipantId,
        sender: ParticipantId,
        receiver: ParticipantId,
    },
}
