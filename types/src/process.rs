//! Router processes: the synthesized action tree for one participant.
//!
//! A router process is the pre-FSM result of endpoint synthesis. It spells out
//! the exact RECEIVE/SEND sequence the router for one participant performs,
//! including forwarding the outcome of choices to dependent peers. Recursion
//! is still nominal here; the FSM transformation replaces it with structural
//! back-edges.

use crate::{ParticipantId, RecVar, ValueType};
use indexmap::IndexMap;

/// What a RECEIVE action expects on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A branch label (always a string)
    Label,
    /// A typed value following a label
    Value(ValueType),
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Label => write!(f, "LABEL"),
            MessageKind::Value(v) => write!(f, "{}", v),
        }
    }
}

/// What follows a RECEIVE action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessNext {
    /// Label receives branch on the label that arrived
    Branches(IndexMap<String, RouterProcess>),
    /// Value receives have a single continuation
    Continuation(Box<RouterProcess>),
}

/// The synthesized router behaviour for one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterProcess {
    /// Protocol complete
    End,
    /// Wait for a message from `from`
    Receive {
        from: ParticipantId,
        message: MessageKind,
        next: ProcessNext,
    },
    /// Forward the message just received to `to`, and independently to every
    /// peer in `deps`
    Send {
        to: ParticipantId,
        deps: Vec<ParticipantId>,
        continuation: Box<RouterProcess>,
    },
    /// Recursion definition binding a variable in its continuation
    RecursionDefinition {
        variable: RecVar,
        continuation: Box<RouterProcess>,
    },
    /// Recursive call to an enclosing definition
    RecursiveCall { variable: RecVar },
}

impl RouterProcess {
    /// Receive a label from `from`, then branch
    #[must_use]
    pub fn receive_label(
        from: impl Into<ParticipantId>,
        branches: impl IntoIterator<Item = (String, RouterProcess)>,
    ) -> Self {
        RouterProcess::Receive {
            from: from.into(),
            message: MessageKind::Label,
            next: ProcessNext::Branches(branches.into_iter().collect()),
        }
    }

    /// Receive a typed value from `from`, then continue
    #[must_use]
    pub fn receive_value(
        from: impl Into<ParticipantId>,
        value_type: ValueType,
        continuation: RouterProcess,
    ) -> Self {
        RouterProcess::Receive {
            from: from.into(),
            message: MessageKind::Value(value_type),
            next: ProcessNext::Continuation(Box::new(continuation)),
        }
    }

    /// Forward to `to` and to every dependency in `deps`
    #[must_use]
    pub fn send(
        to: impl Into<ParticipantId>,
        deps: Vec<ParticipantId>,
        continuation: RouterProcess,
    ) -> Self {
        RouterProcess::Send {
            to: to.into(),
            deps,
            continuation: Box::new(continuation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn receive_label_collects_branches() {
        let p = RouterProcess::receive_label(
            "c",
            [
                (
                    "login".to_string(),
                    RouterProcess::send("s", vec![], RouterProcess::End),
                ),
                ("quit".to_string(), RouterProcess::End),
            ],
        );
        assert_matches!(p, RouterProcess::Receive { from, message, next } => {
            assert_eq!(from, "c");
            assert_eq!(message, MessageKind::Label);
            assert_matches!(next, ProcessNext::Branches(b) => assert_eq!(b.len(), 2));
        });
    }

    #[test]
    fn message_kind_display() {
        assert_eq!(MessageKind::Label.to_string(), "LABEL");
        assert_eq!(MessageKind::Value(ValueType::Int).to_string(), "int");
    }
}
