//! Router configuration: CLI options and the protocol description loader.

use crate::RouterError;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use switchboard_types::ProtocolDescription;

/// What to do when a protocol violation is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViolationPolicy {
    /// Log, notify every other router and the wrapped party, terminate.
    Abort,
    /// Log and roll back to the last receive state so the input can be
    /// retried.
    Recover,
}

/// Protocol-enforcing message router.
#[derive(Debug, Parser)]
#[command(name = "switchboard-router", version)]
pub struct RouterOptions {
    /// Path to the protocol description file
    #[arg(long, env = "PROTOCOL_PATH")]
    pub protocol: PathBuf,

    /// Violation handling policy
    #[arg(long, value_enum, default_value_t = ViolationPolicy::Abort)]
    pub policy: ViolationPolicy,
}

/// Load and parse a protocol description file.
pub fn load_protocol(path: &Path) -> Result<ProtocolDescription, RouterError> {
    let text = std::fs::read_to_string(path).map_err(|source| RouterError::ReadProtocol {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RouterError::ParseProtocol {
        path: path.display().to_string(),
        source,
    })
}
