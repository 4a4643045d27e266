/*============================================================
  Synvera Project: Syn-Cord
  Module: syncord_core::error
  Etiquette: Synvera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Syn-Cord-Core error types to provide consistent
    diagnostics and exit semantics.

  Security / Safety Notes:
    Error contexts expose command names, HTTP endpoints, and
    high-level paths only; captured process output is carried
    verbatim because it is the operator's diagnostic surface.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate fatal failures and
    consolidate exit codes for the binary entry point.

  Revision History:
    2026-01-19 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Syn-Cord-Core operations.
pub type Result<T> = std::result::Result<T, SyncordError>;

/// Enumerates high-level error domains surfaced by Syn-Cord-Core.
#[derive(Debug, Error)]
pub enum SyncordError {
    #[error("Required command `{command}` not found in PATH")]
    CommandMissing { command: String },
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailure {
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
    },
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("Release: {0}")]
    Release(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SyncordError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SyncordError::CommandMissing { .. } => ExitCode::from(10),
            SyncordError::CommandFailure { .. } => ExitCode::from(11),
            SyncordError::Config(_) => ExitCode::from(20),
            SyncordError::Network(_) => ExitCode::from(30),
            SyncordError::Release(_) => ExitCode::from(31),
            SyncordError::Serialization(_) => ExitCode::from(32),
            SyncordError::Filesystem(_) => ExitCode::from(40),
            SyncordError::Runtime(_) => ExitCode::from(50),
            SyncordError::Io(_) => ExitCode::from(41),
        }
    }

    /// Classify a failure to spawn an external command.
    pub fn spawn(command: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            SyncordError::CommandMissing {
                command: command.into(),
            }
        } else {
            SyncordError::Runtime(format!("Failed to spawn {command}: {err}"))
        }
    }
}
