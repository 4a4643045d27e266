/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::apt
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Drive the install program (`apt-get install -y`) to apply a
    downloaded release artifact to the system.

  Security / Safety Notes:
    Installation requires the privileges the operator launched
    us with; the command is invoked as-is without sudo wrapping.

  Dependencies:
    tokio::process for async command execution.

  Operational Scope:
    Called by the update workflow once per applied release;
    both output streams are preserved in the session log.

  Revision History:
    2026-01-19 COD  Crafted apt install integration.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Full command diagnostics on failure
============================================================*/

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Result, SyncordError};
use crate::logger::Logger;

/// Install the artifact via `<program> install -y <artifact>`.
///
/// Stdout is logged on success; on failure both streams are logged before
/// the command failure is returned, so the session log always carries the
/// installer's own diagnostics.
pub async fn install_artifact(program: &str, artifact: &Path, logger: &Logger) -> Result<()> {
    let output = Command::new(program)
        .arg("install")
        .arg("-y")
        .arg(artifact)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| SyncordError::spawn(program, err))?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        logger.info("INSTALL", format!("stdout: {stdout}"));
        logger.info("INSTALL", format!("stderr: {stderr}"));
        return Err(SyncordError::CommandFailure {
            command: format!("{program} install -y {}", artifact.display()),
            status: output.status.code().unwrap_or(-1),
            stdout,
            stderr,
        });
    }

    logger.info("INSTALL", format!("stdout: {stdout}"));
    Ok(())
}
