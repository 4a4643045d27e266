/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::report
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Summarize a completed run as a JSON document for the Bash
    orchestrator and monitoring hooks.

  Security / Safety Notes:
    Report data is written to operator-controlled paths; no
    privileged operations are performed.

  Dependencies:
    serde for JSON serialization.

  Operational Scope:
    Written once per run, success or failure, after the update
    workflow settles.

  Revision History:
    2026-01-20 COD  Authored run report writer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - One receipt per run, failures included
    - Explicit action attribution for audit
============================================================*/

use std::fs::File;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Result, SyncordError};

/// Wrapper representing the full run report document.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub generated_by: String,
    pub package: String,
    pub action: RunAction,
    pub installed_version: Option<String>,
    pub latest_version: Option<String>,
    pub artifact: Option<String>,
    pub artifact_bytes: Option<u64>,
    pub error: Option<String>,
    pub duration_secs: f64,
}

/// Terminal classification of a run.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunAction {
    UpToDate,
    Updated,
    DryRun,
    Failed,
}

impl RunReport {
    /// Start a report skeleton stamped with the current time.
    pub fn new(package: &str, action: RunAction, duration_secs: f64) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            generated_by: "syncord_core".to_string(),
            package: package.to_string(),
            action,
            installed_version: None,
            latest_version: None,
            artifact: None,
            artifact_bytes: None,
            error: None,
            duration_secs,
        }
    }
}

/// Persist the report to the given path.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            SyncordError::Filesystem(format!(
                "Failed to create report directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    let file = File::create(path).map_err(|err| {
        SyncordError::Filesystem(format!(
            "Failed to create report file {}: {err}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, report).map_err(|err| {
        SyncordError::Filesystem(format!("Failed to write report {}: {err}", path.display()))
    })?;
    Ok(())
}
