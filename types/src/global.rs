//! Global types for multiparty protocols.
//!
//! A global type describes a protocol from the bird's-eye view: the complete
//! interaction pattern between all participants, including message exchanges,
//! labelled choice, and recursion. Global types are supplied externally as
//! JSON (see [`crate::ProtocolDescription`]) and are immutable once parsed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identifier of a protocol participant.
pub type ParticipantId = String;

/// Recursion variable name bound by a recursion definition.
pub type RecVar = String;

/// Payload type carried by a labelled message.
///
/// `Unit` means the label itself is the whole message; any other tag means a
/// value of that type follows the label in a separate envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// No value follows the label
    #[default]
    Unit,
    /// UTF-8 string
    Str,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Any number
    Real,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::Unit => "unit",
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::Real => "real",
        };
        write!(f, "{}", name)
    }
}

/// One labelled branch of an exchange: the payload type and what follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Type of the value exchanged after the label
    #[serde(rename = "valueType", default)]
    pub value_type: ValueType,
    /// Rest of the protocol on this branch
    #[serde(rename = "protocolContinuation")]
    pub continuation: GlobalType,
}

impl Branch {
    /// Create a branch with an explicit payload type
    #[must_use]
    pub fn new(value_type: ValueType, continuation: GlobalType) -> Self {
        Self {
            value_type,
            continuation,
        }
    }

    /// Create a branch whose label carries no value
    #[must_use]
    pub fn unit(continuation: GlobalType) -> Self {
        Self::new(ValueType::Unit, continuation)
    }
}

/// Global types describe protocols from the bird's-eye view.
///
/// # Syntax
///
/// - `End`: protocol termination
/// - `Exchange { sender, receiver, branches }`: the sender picks one label,
///   the receiver learns it, an optional typed value follows
/// - `RecursionDefinition { variable, continuation }`: binds a recursion
///   variable in its continuation
/// - `RecursiveCall { variable }`: jump back to the enclosing binder
///
/// # Examples
///
/// ```
/// use switchboard_types::GlobalType;
///
/// // c -> s: ping. end
/// let g = GlobalType::send("c", "s", "ping", GlobalType::End);
/// assert_eq!(g.participants().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalType {
    /// Protocol termination
    End,
    /// Labelled message exchange between two participants
    Exchange {
        sender: ParticipantId,
        receiver: ParticipantId,
        branches: IndexMap<String, Branch>,
    },
    /// Recursion definition binding a variable in its continuation
    RecursionDefinition {
        #[serde(rename = "recursionVariable")]
        variable: RecVar,
        #[serde(rename = "protocolContinuation")]
        continuation: Box<GlobalType>,
    },
    /// Recursive call to an enclosing definition
    RecursiveCall {
        #[serde(rename = "recursionVariable")]
        variable: RecVar,
    },
}

impl GlobalType {
    /// Create a single-branch exchange whose label carries no value
    #[must_use]
    pub fn send(
        sender: impl Into<ParticipantId>,
        receiver: impl Into<ParticipantId>,
        label: impl Into<String>,
        continuation: GlobalType,
    ) -> Self {
        GlobalType::Exchange {
            sender: sender.into(),
            receiver: receiver.into(),
            branches: IndexMap::from([(label.into(), Branch::unit(continuation))]),
        }
    }

    /// Create an exchange with explicit branches
    #[must_use]
    pub fn exchange(
        sender: impl Into<ParticipantId>,
        receiver: impl Into<ParticipantId>,
        branches: impl IntoIterator<Item = (String, Branch)>,
    ) -> Self {
        GlobalType::Exchange {
            sender: sender.into(),
            receiver: receiver.into(),
            branches: branches.into_iter().collect(),
        }
    }

    /// Create a recursion definition
    #[must_use]
    pub fn rec(variable: impl Into<RecVar>, continuation: GlobalType) -> Self {
        GlobalType::RecursionDefinition {
            variable: variable.into(),
            continuation: Box::new(continuation),
        }
    }

    /// Create a recursive call
    #[must_use]
    pub fn call(variable: impl Into<RecVar>) -> Self {
        GlobalType::RecursiveCall {
            variable: variable.into(),
        }
    }

    /// Collect every participant mentioned by an exchange in this type.
    #[must_use]
    pub fn participants(&self) -> Vec<ParticipantId> {
        let mut result = HashSet::new();
        self.collect_participants(&mut result);
        result.into_iter().collect()
    }

    fn collect_participants(&self, out: &mut HashSet<ParticipantId>) {
        match self {
            GlobalType::End | GlobalType::RecursiveCall { .. } => {}
            GlobalType::Exchange {
                sender,
                receiver,
                branches,
            } => {
                out.insert(sender.clone());
                out.insert(receiver.clone());
                for branch in branches.values() {
                    branch.continuation.collect_participants(out);
                }
            }
            GlobalType::RecursionDefinition { continuation, .. } => {
                continuation.collect_participants(out);
            }
        }
    }
}
