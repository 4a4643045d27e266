/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::dpkg
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Interface with the dpkg status database to determine the
    version of the managed package currently installed.

  Security / Safety Notes:
    Executes the status program with caller privileges only;
    no privilege escalation is attempted here.

  Dependencies:
    tokio::process for async command execution.

  Operational Scope:
    Supplies the update workflow with the locally installed
    version, or None when the package is absent.

  Revision History:
    2026-01-19 COD  Crafted dpkg status integration.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Structured parsing with clear failure modes
============================================================*/

use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Result, SyncordError};

/// Query the status program (`dpkg -s <package>`) for the installed version.
///
/// A non-zero exit simply means the package is not installed; the status
/// database reports that through its exit code rather than through stdout,
/// so the output is scanned either way and `None` is returned when no
/// `Version` field is present.
pub async fn installed_version(program: &str, package: &str) -> Result<Option<String>> {
    let output = Command::new(program)
        .arg("-s")
        .arg(package)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| SyncordError::spawn(program, err))?;

    let stdout = String::from_utf8(output.stdout).map_err(|err| {
        SyncordError::Serialization(format!("{program} -s emitted invalid UTF-8: {err}"))
    })?;

    Ok(parse_version_field(&stdout))
}

/// Extract the value of the first `Version` field in dpkg status output.
fn parse_version_field(stdout: &str) -> Option<String> {
    for line in stdout.lines() {
        if line.starts_with("Version") {
            return line.split_whitespace().nth(1).map(str::to_string);
        }
    }
    None
}
