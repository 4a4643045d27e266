/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load Syn-Cord-Core configuration from TOML with compiled
    defaults covering the stock Discord-on-Debian deployment.

  Security / Safety Notes:
    Configuration is operator-owned plain data; no secrets are
    expected or redacted.

  Dependencies:
    serde + toml for parsing, dirs for the default location.

  Operational Scope:
    Resolved once per run in main and passed by reference to
    the workflow and its collaborators.

  Revision History:
    2026-01-19 COD  Authored configuration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Compiled defaults with explicit operator overrides
    - Loud validation before any side effect
    - Single resolution point per run
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SyncordError};

/// Top-level configuration for Syn-Cord-Core.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncordConfig {
    pub package: PackageConfig,
    pub release: ReleaseConfig,
    pub logging: LoggingConfig,
    pub report: ReportConfig,
}

/// Identity of the managed package and the tools that serve it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub name: String,
    pub status_program: String,
    pub install_program: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "discord".into(),
            status_program: "dpkg".into(),
            install_program: "apt-get".into(),
        }
    }
}

/// Vendor download endpoint and artifact handling knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub endpoint: String,
    pub platform: String,
    pub format: String,
    pub download_dir: PathBuf,
    pub chunk_size_mib: u64,
    /// Whole-request timeout in seconds; 0 leaves network calls unbounded.
    pub timeout_secs: u64,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://discord.com/api/download".into(),
            platform: "linux".into(),
            format: "deb".into(),
            download_dir: PathBuf::from("."),
            chunk_size_mib: 10,
            timeout_secs: 0,
        }
    }
}

/// Session logfile placement and retention.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub suffix: String,
    /// Number of logfiles to keep; negative disables pruning entirely.
    pub retain: i64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            suffix: ".log.txt".into(),
            retain: 5,
        }
    }
}

/// Run-report placement; `None` resolves under the log directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub path: Option<PathBuf>,
}

impl SyncordConfig {
    /// Load configuration from an explicit path, the default location, or
    /// compiled defaults when no file exists.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(explicit) => Self::load_file(explicit)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load_file(&default)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SyncordError::Config(format!("Failed to read config {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            SyncordError::Config(format!("Failed to parse config {}: {err}", path.display()))
        })
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("syn-cord").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.package.name.trim().is_empty() {
            return Err(SyncordError::Config("package.name must not be empty".into()));
        }
        if self.release.endpoint.trim().is_empty() {
            return Err(SyncordError::Config(
                "release.endpoint must not be empty".into(),
            ));
        }
        if self.release.chunk_size_mib == 0 {
            return Err(SyncordError::Config(
                "release.chunk_size_mib must be at least 1".into(),
            ));
        }
        if self.logging.suffix.trim().is_empty() {
            return Err(SyncordError::Config("logging.suffix must not be empty".into()));
        }
        Ok(())
    }

    /// Directory receiving session logfiles.
    pub fn log_dir(&self) -> PathBuf {
        self.logging.directory.clone()
    }

    /// Destination of the JSON run report.
    pub fn report_path(&self) -> PathBuf {
        self.report
            .path
            .clone()
            .unwrap_or_else(|| self.log_dir().join("syn-cord-report.json"))
    }

    /// Absolute path the downloaded artifact is written to.
    pub fn artifact_path(&self, filename: &str) -> Result<PathBuf> {
        let dir = if self.release.download_dir.is_absolute() {
            self.release.download_dir.clone()
        } else {
            std::env::current_dir()
                .map_err(|err| {
                    SyncordError::Filesystem(format!(
                        "Failed to resolve working directory: {err}"
                    ))
                })?
                .join(&self.release.download_dir)
        };
        // Collecting components drops `.` segments left by the default
        // download_dir, keeping logged paths clean.
        Ok(dir.join(filename).components().collect())
    }
}
