//! Finite state machine support for switchboard routers.
//!
//! The synthesized [`switchboard_types::RouterProcess`] still names its
//! recursion variables; this crate links it into a [`Machine`], a cyclic
//! graph of states where recursion is a plain back-edge and a single entry
//! node starts the run. The runtime interprets the machine with one mutable
//! cursor and never touches the graph again.
//!
//! # Example
//!
//! ```
//! use switchboard_types::RouterProcess;
//! use switchboard_fsm::{transform, ActionKind};
//!
//! let process = RouterProcess::receive_label(
//!     "c",
//!     [("quit".to_string(), RouterProcess::End)],
//! );
//! let machine = transform("s", &process).unwrap();
//! assert!(matches!(machine.action(machine.entry()), ActionKind::Receive { .. }));
//! ```

mod machine;
mod transform;

pub use machine::{ActionKind, Machine, StateId, Transition};
pub use transform::{transform, TransformError};
