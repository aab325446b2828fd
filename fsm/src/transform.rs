//! The linking pass: router process tree to state machine graph.
//!
//! Walks the synthesized [`RouterProcess`] depth-first, eliminating named
//! recursion in favour of structural back-edges. A recursion definition does
//! not allocate a state of its own: its variable stays pending until the next
//! RECEIVE or SEND materializes a state, at which point every pending
//! variable is bound to it. Recursive calls then resolve through the binding
//! table into edges pointing back at earlier states.

use crate::machine::{ActionKind, Machine, Transition};
use petgraph::graph::{Graph, NodeIndex};
use std::collections::HashMap;
use switchboard_types::{ParticipantId, ProcessNext, RecVar, RouterProcess};
use thiserror::Error;

/// Errors raised while linking a router process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A recursive call had no bound state to point back to. The checker
    /// rejects protocols that could produce this.
    #[error("recursive call to unbound variable {0}")]
    UnboundVariable(String),
}

/// Link a synthesized router process into a state machine for `role`.
pub fn transform(role: impl Into<ParticipantId>, process: &RouterProcess) -> Result<Machine, TransformError> {
    let mut graph = Graph::new();
    let mut bindings = HashMap::new();
    let entry = build(&mut graph, process, &mut bindings, Vec::new())?;
    Ok(Machine::new(role.into(), graph, entry))
}

fn build(
    graph: &mut Graph<ActionKind, Transition>,
    process: &RouterProcess,
    bindings: &mut HashMap<RecVar, NodeIndex>,
    mut pending: Vec<RecVar>,
) -> Result<NodeIndex, TransformError> {
    match process {
        RouterProcess::End => Ok(graph.add_node(ActionKind::End)),
        RouterProcess::Receive {
            from,
            message,
            next,
        } => {
            let state = graph.add_node(ActionKind::Receive {
                from: from.clone(),
                message: *message,
            });
            for variable in pending.drain(..) {
                bindings.insert(variable, state);
            }
            match next {
                ProcessNext::Branches(branches) => {
                    for (label, branch) in branches {
                        let target = build(graph, branch, bindings, Vec::new())?;
                        graph.add_edge(state, target, Transition::Branch(label.clone()));
                    }
                }
                ProcessNext::Continuation(continuation) => {
                    let target = build(graph, continuation, bindings, Vec::new())?;
                    graph.add_edge(state, target, Transition::Continuation);
                }
            }
            Ok(state)
        }
        RouterProcess::Send {
            to,
            deps,
            continuation,
        } => {
            let state = graph.add_node(ActionKind::Send {
                to: to.clone(),
                deps: deps.clone(),
            });
            for variable in pending.drain(..) {
                bindings.insert(variable, state);
            }
            let target = build(graph, continuation, bindings, Vec::new())?;
            graph.add_edge(state, target, Transition::Continuation);
            Ok(state)
        }
        RouterProcess::RecursionDefinition {
            variable,
            continuation,
        } => {
            // No state of its own: the next action will claim the variable
            pending.push(variable.clone());
            build(graph, continuation, bindings, pending)
        }
        RouterProcess::RecursiveCall { variable } => bindings
            .get(variable)
            .copied()
            .ok_or_else(|| TransformError::UnboundVariable(variable.clone())),
    }
}
