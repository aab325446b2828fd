//! Static compilation pipeline for switchboard routers.
//!
//! Turns a [`switchboard_types::GlobalType`] into the action tree a single
//! router executes, in three stages:
//!
//! 1. [`check::check_global_type`] — static scoping rules
//! 2. [`project::relative_projection`] — the protocol each pair of
//!    participants observes, plus the dependency analysis for non-local
//!    choices ([`project::ddep`], [`synthesize::hdep`])
//! 3. [`synthesize::synthesize`] — the RECEIVE/SEND tree realizing one
//!    participant's router role
//!
//! The FSM linking pass lives in `switchboard-fsm`; the runtime interpreter
//! in `switchboard-router`.

pub mod check;
mod error;
pub mod project;
pub mod synthesize;

pub use check::check_global_type;
pub use error::{ProjectionError, SchemaError};
pub use project::{check_relative_wellformedness, ddep, relative_projection, DependencyAnalysis};
pub use synthesize::{hdep, synthesize};
