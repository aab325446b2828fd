//! Core protocol types for switchboard routers.
//!
//! This crate holds the pure data models the compiler pipeline and runtime
//! share:
//!
//! | Type | Stage |
//! |------|-------|
//! | [`GlobalType`] | external input, parsed once |
//! | [`RelativeType`] | derived during projection, transient |
//! | [`RouterProcess`] | derived during synthesis, transient |
//! | [`Envelope`] | runtime wire format |
//! | [`ProtocolDescription`] | startup input artifact |
//!
//! No logic lives here beyond structural predicates on the types themselves.

mod global;
mod message;
mod process;
mod protocol;
mod relative;

pub use global::{Branch, GlobalType, ParticipantId, RecVar, ValueType};
pub use message::{Envelope, Payload};
pub use process::{MessageKind, ProcessNext, RouterProcess};
pub use protocol::ProtocolDescription;
pub use relative::{DependencyKind, RelativeBranch, RelativeType};
