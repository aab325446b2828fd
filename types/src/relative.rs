//! Relative types: the protocol observed by one pair of participants.
//!
//! A relative type is the projection of a global type onto an ordered pair
//! `(p, q)`. It has the shape of a global type plus one extra variant,
//! [`RelativeType::Dependency`], which records a choice made elsewhere in the
//! protocol whose outcome the pair must still learn (a non-local choice).

use crate::{ParticipantId, RecVar, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How a non-local choice reaches the pair.
///
/// `Output` when one of the pair is the choosing sender, `Input` when one of
/// the pair is the receiver who learns the choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DependencyKind {
    Output,
    Input,
}

/// One branch of a projected exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeBranch {
    /// Type of the value exchanged after the label
    #[serde(rename = "valueType", default)]
    pub value_type: ValueType,
    /// Rest of the pair's view on this branch
    #[serde(rename = "protocolContinuation")]
    pub continuation: RelativeType,
}

/// The protocol as observed by a pair of participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelativeType {
    /// Nothing left to observe
    End,
    /// A direct exchange between the pair; the sender picks the label
    Exchange {
        sender: ParticipantId,
        branches: IndexMap<String, RelativeBranch>,
    },
    /// A non-local choice the pair must learn the outcome of.
    ///
    /// The pair never sees the exchanged value itself, so branches carry
    /// continuations only.
    Dependency {
        sender: ParticipantId,
        receiver: ParticipantId,
        #[serde(rename = "dependencyType")]
        kind: DependencyKind,
        branches: IndexMap<String, RelativeType>,
    },
    /// Recursion definition binding a variable in its continuation
    RecursionDefinition {
        #[serde(rename = "recursionVariable")]
        variable: RecVar,
        #[serde(rename = "protocolContinuation")]
        continuation: Box<RelativeType>,
    },
    /// Recursive call to an enclosing definition
    RecursiveCall {
        #[serde(rename = "recursionVariable")]
        variable: RecVar,
    },
}

impl RelativeType {
    /// Whether a loop body produces an observable action before recursing.
    ///
    /// A projected loop body is contractive with respect to its own recursion
    /// variable unless it is exactly `End` or exactly a recursive call to that
    /// variable. A non-contractive body means the loop is invisible to the
    /// pair and the whole definition collapses to `End`.
    #[must_use]
    pub fn is_contractive(&self, variable: &str) -> bool {
        match self {
            RelativeType::End => false,
            RelativeType::RecursiveCall { variable: v } => v != variable,
            RelativeType::RecursionDefinition { continuation, .. } => {
                continuation.is_contractive(variable)
            }
            RelativeType::Exchange { .. } | RelativeType::Dependency { .. } => true,
        }
    }
}
