//! Graph representation of a router's finite state machine.
//!
//! States are nodes in a petgraph arena; recursion appears as back-edges, so
//! the machine is a cyclic graph with a single entry node. The runtime owns
//! exactly one mutable cursor into this graph and never mutates the graph
//! itself after construction.

use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use switchboard_types::{MessageKind, ParticipantId};

/// Handle of one machine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateId(NodeIndex);

impl StateId {
    /// The underlying arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0.index()
    }
}

/// The action a state performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Wait for a message from `from`
    Receive {
        from: ParticipantId,
        message: MessageKind,
    },
    /// Forward the received message to `to` and to every peer in `deps`
    Send {
        to: ParticipantId,
        deps: Vec<ParticipantId>,
    },
    /// Protocol complete; no outgoing transitions
    End,
}

/// Edge weight: how a state advances to its successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Taken when the received label matches
    Branch(String),
    /// Unconditional successor
    Continuation,
}

/// A router's state machine.
#[derive(Debug, Clone)]
pub struct Machine {
    role: ParticipantId,
    graph: Graph<ActionKind, Transition>,
    entry: StateId,
}

impl Machine {
    pub(crate) fn new(role: ParticipantId, graph: Graph<ActionKind, Transition>, entry: NodeIndex) -> Self {
        Self {
            role,
            graph,
            entry: StateId(entry),
        }
    }

    /// The participant this machine routes for.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// The designated entry state.
    #[must_use]
    pub fn entry(&self) -> StateId {
        self.entry
    }

    /// The action performed at a state.
    #[must_use]
    pub fn action(&self, state: StateId) -> &ActionKind {
        &self.graph[state.0]
    }

    /// The successor reached when the given label arrives at a branching
    /// receive state.
    #[must_use]
    pub fn branch_target(&self, state: StateId, label: &str) -> Option<StateId> {
        self.graph
            .edges_directed(state.0, Direction::Outgoing)
            .find(|e| matches!(e.weight(), Transition::Branch(l) if l == label))
            .map(|e| StateId(e.target()))
    }

    /// The unconditional successor of a non-branching state.
    #[must_use]
    pub fn continuation(&self, state: StateId) -> Option<StateId> {
        self.graph
            .edges_directed(state.0, Direction::Outgoing)
            .find(|e| matches!(e.weight(), Transition::Continuation))
            .map(|e| StateId(e.target()))
    }

    /// Labels accepted at a branching receive state.
    #[must_use]
    pub fn branch_labels(&self, state: StateId) -> Vec<&str> {
        self.graph
            .edges_directed(state.0, Direction::Outgoing)
            .filter_map(|e| match e.weight() {
                Transition::Branch(l) => Some(l.as_str()),
                Transition::Continuation => None,
            })
            .collect()
    }

    /// Number of outgoing transitions of a state.
    #[must_use]
    pub fn out_degree(&self, state: StateId) -> usize {
        self.graph
            .edges_directed(state.0, Direction::Outgoing)
            .count()
    }

    /// Total counts of states and transitions.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        (self.graph.node_count(), self.graph.edge_count())
    }

    /// Iterate over all state handles.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.graph.node_indices().map(StateId)
    }
}
