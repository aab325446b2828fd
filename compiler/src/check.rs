//! Static well-formedness checking for global types.
//!
//! A depth-first traversal that rejects exchanges whose sender or receiver is
//! not in the participant table, recursive calls to variables with no
//! enclosing definition, and redefinition of a variable still in scope.
//! Scope is per branch: each branch of an exchange inherits the parent scope
//! independently, so a definition in one branch never leaks into a sibling.

use crate::SchemaError;
use indexmap::IndexMap;
use switchboard_types::{GlobalType, ParticipantId};

/// Check a global type against the participant table.
pub fn check_global_type(
    global: &GlobalType,
    participants: &IndexMap<ParticipantId, String>,
) -> Result<(), SchemaError> {
    check(global, &[], participants)
}

fn check(
    global: &GlobalType,
    bound: &[&str],
    participants: &IndexMap<ParticipantId, String>,
) -> Result<(), SchemaError> {
    match global {
        GlobalType::End => Ok(()),
        GlobalType::Exchange {
            sender,
            receiver,
            branches,
        } => {
            if !participants.contains_key(sender) || !participants.contains_key(receiver) {
                return Err(SchemaError::UndefinedParticipant {
                    sender: sender.clone(),
                    receiver: receiver.clone(),
                });
            }
            for branch in branches.values() {
                check(&branch.continuation, bound, participants)?;
            }
            Ok(())
        }
        GlobalType::RecursiveCall { variable } => {
            if bound.contains(&variable.as_str()) {
                Ok(())
            } else {
                Err(SchemaError::UnboundVariable(variable.clone()))
            }
        }
        GlobalType::RecursionDefinition {
            variable,
            continuation,
        } => {
            if bound.contains(&variable.as_str()) {
                return Err(SchemaError::RedefinedVariable(variable.clone()));
            }
            let mut extended = bound.to_vec();
            extended.push(variable);
            check(continuation, &extended, participants)
        }
    }
}
