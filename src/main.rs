/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Syn-Cord Core. Probes the installed Discord
    package, resolves the newest vendor release, and applies it
    when stale, leaving a session log and a JSON run report for
    the Syn-Cord orchestrator.

  Security / Safety Notes:
    Spawns dpkg/apt-get and performs HTTPS requests against the
    configured endpoint only. The install step needs root; a
    warning is emitted when invoked without it.

  Dependencies:
    clap for CLI parsing, chrono for timestamps, libc for the
    privilege probe.

  Operational Scope:
    Invoked by the Syn-Cord Bash layer via `syn-cord run` or by
    operators and timers requiring a standalone update pass.

  Revision History:
    2026-01-19 COD  Authored Syn-Cord Core runtime.
    2026-02-02 COD  Wired run report and dry-run summary.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod apt;
mod config;
mod dpkg;
mod error;
mod logger;
mod release;
mod release_info;
mod report;
mod retention;
mod workflow;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use chrono::Utc;
use clap::{ArgAction, Parser};

use config::SyncordConfig;
use error::Result;
use logger::Logger;
use report::{write_report, RunAction, RunReport};
use retention::prune_old_logs;
use workflow::{run_update, UpdateOutcome};

/// Command-line arguments for Syn-Cord-Core.
#[derive(Debug, Parser)]
#[command(
    name = "Syn-Cord-Core",
    version,
    author = "Synavera Systems",
    about = "Conscious package updater for Syn-Cord"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override run report output path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Resolve and compare versions without downloading or installing.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Syn-Cord-Core] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref();
    let config = SyncordConfig::load_from_optional_path(config_path)?;

    let report_path = cli.report.clone().unwrap_or_else(|| config.report_path());

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli.log.clone().or_else(|| {
        Some(
            config
                .log_dir()
                .join(format!("syn-cord_{session_stamp}{}", config.logging.suffix)),
        )
    });
    let logger = Logger::new(log_path.clone(), cli.verbose)?;
    logger.info("INIT", "Syn-Cord Core awakening.");

    #[cfg(unix)]
    if !cli.dry_run {
        // geteuid cannot fail.
        let euid = unsafe { libc::geteuid() };
        if euid != 0 {
            logger.warn(
                "PRIV",
                "Not running as root; the install step will likely fail",
            );
        }
    }

    let started = Instant::now();
    let outcome = run_update(&config, &logger, cli.dry_run).await;
    let duration_secs = started.elapsed().as_secs_f64();

    let mut report = RunReport::new(&config.package.name, RunAction::Failed, duration_secs);
    match &outcome {
        Ok(UpdateOutcome::UpToDate { version }) => {
            report.action = RunAction::UpToDate;
            report.installed_version = Some(version.clone());
            report.latest_version = Some(version.clone());
            logger.info(
                "SUMMARY",
                format!(
                    "package={} action=UPTODATE version={version}",
                    config.package.name
                ),
            );
        }
        Ok(UpdateOutcome::Updated {
            previous,
            version,
            artifact,
            bytes,
        }) => {
            report.action = RunAction::Updated;
            report.installed_version = previous.clone();
            report.latest_version = Some(version.clone());
            report.artifact = Some(artifact.display().to_string());
            report.artifact_bytes = Some(*bytes);
            logger.info(
                "SUMMARY",
                format!(
                    "package={} action=UPDATED previous={} version={version} bytes={bytes}",
                    config.package.name,
                    previous.as_deref().unwrap_or("none")
                ),
            );
        }
        Ok(UpdateOutcome::DryRun {
            installed,
            latest,
            update_available,
        }) => {
            report.action = RunAction::DryRun;
            report.installed_version = installed.clone();
            report.latest_version = Some(latest.clone());
            logger.info(
                "SUMMARY",
                format!(
                    "package={} action=DRYRUN installed={} newest={latest} update_available={update_available}",
                    config.package.name,
                    installed.as_deref().unwrap_or("none")
                ),
            );
            print_summary(installed.as_deref(), latest, *update_available);
        }
        Err(err) => {
            report.error = Some(err.to_string());
            logger.error("FATAL", format!("{err}"));
        }
    }

    if let Err(err) = write_report(&report, &report_path) {
        logger.warn("REPORT", format!("Failed to write run report: {err}"));
    } else {
        logger.info(
            "REPORT",
            format!("Report written to {}", report_path.display()),
        );
    }

    match prune_old_logs(
        &config.log_dir(),
        config.logging.retain,
        &config.logging.suffix,
        &logger,
    ) {
        Ok(summary) => {
            logger.info(
                "RETAIN",
                format!(
                    "Retention pass complete: examined={} deleted={}",
                    summary.examined, summary.deleted
                ),
            );
        }
        Err(err) => {
            logger.warn("RETAIN", format!("Retention pass failed: {err}"));
        }
    }

    logger.info("COMPLETE", "Cord synchronised.");

    match outcome {
        Ok(_) => {
            logger.finalize()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            // The run error stays primary; a failed hash write is echoed.
            if let Err(hash_err) = logger.finalize() {
                eprintln!("[Syn-Cord-Core] {hash_err}");
            }
            Err(err)
        }
    }
}

fn print_summary(installed: Option<&str>, latest: &str, update_available: bool) {
    println!(
        "→ Update dry-run. Installed={} Newest={} UpdateAvailable={}",
        installed.unwrap_or("none"),
        latest,
        update_available
    );
}
