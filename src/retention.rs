/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::retention
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Trim the session log directory to the configured number of
    logfiles, oldest first, with post-delete verification.

  Security / Safety Notes:
    Only files carrying the configured log suffix (and their
    hash companions) are ever touched; nothing outside the log
    directory is examined.

  Dependencies:
    std::fs only.

  Operational Scope:
    Invoked once at the end of every run; per-file failures are
    logged and skipped so retention never aborts a run.

  Revision History:
    2026-01-19 COD  Authored retention sweep.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deletion strictly bounded by suffix match
    - Oldest-first removal with verification
    - Failures degrade to warnings, never to aborts
============================================================*/

use std::path::{Path, PathBuf};

use crate::error::{Result, SyncordError};
use crate::logger::Logger;

/// Outcome of one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionSummary {
    /// Logfiles found carrying the configured suffix.
    pub examined: usize,
    /// Logfiles removed and verified gone.
    pub deleted: usize,
}

/// Delete the oldest logfiles beyond `limit`, keeping the newest ones.
///
/// Filenames embed the session timestamp, so a plain descending name sort
/// yields newest-first ordering. A negative limit disables the sweep.
pub fn prune_old_logs(
    dir: &Path,
    limit: i64,
    suffix: &str,
    logger: &Logger,
) -> Result<RetentionSummary> {
    if limit < 0 {
        logger.info("RETAIN", "No limit set - No logs deleted");
        return Ok(RetentionSummary::default());
    }
    logger.info("RETAIN", format!("Searching for old logs in {}", dir.display()));

    let entries = std::fs::read_dir(dir).map_err(|err| {
        SyncordError::Filesystem(format!(
            "Failed to list log directory {}: {err}",
            dir.display()
        ))
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            SyncordError::Filesystem(format!(
                "Failed to read log directory entry in {}: {err}",
                dir.display()
            ))
        })?;
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.ends_with(suffix))
            .unwrap_or(false);
        if is_log && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    files.reverse();
    logger.info("RETAIN", format!("Logfiles: {files:?}"));

    let summary_examined = files.len();
    let keep = limit as usize;
    let mut deleted = 0;
    if files.len() > keep {
        // Tail of the newest-first list holds the oldest sessions.
        for file in files.split_off(keep).iter().rev() {
            logger.info("RETAIN", format!("Trying to delete {}", file.display()));
            if let Err(err) = std::fs::remove_file(file) {
                logger.warn(
                    "RETAIN",
                    format!("Failed to delete {}: {err}", file.display()),
                );
                continue;
            }
            if file.exists() {
                logger.warn(
                    "RETAIN",
                    format!("{} still present after delete", file.display()),
                );
                continue;
            }
            logger.info("RETAIN", format!("Deleted {}", file.display()));
            deleted += 1;
            remove_hash_companion(file, logger);
        }
    }

    Ok(RetentionSummary {
        examined: summary_examined,
        deleted,
    })
}

/// Drop the `.hash` digest written alongside a finalized session log.
fn remove_hash_companion(log: &Path, logger: &Logger) {
    let mut companion_os = log.as_os_str().to_os_string();
    companion_os.push(".hash");
    let companion = PathBuf::from(companion_os);
    match std::fs::remove_file(&companion) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            logger.warn(
                "RETAIN",
                format!("Failed to delete {}: {err}", companion.display()),
            );
        }
    }
}
