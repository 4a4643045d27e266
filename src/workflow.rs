/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::workflow
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Orchestrate one update pass: probe the installed version,
    resolve the newest release, and when stale download the
    artifact, install it, and clean up.

  Security / Safety Notes:
    The install step may modify the system; the downloaded
    artifact is removed afterwards whether or not the install
    succeeded.

  Dependencies:
    Crate-internal collaborators only.

  Operational Scope:
    Entered once per run from main; returns a terminal outcome
    or the first hard failure.

  Revision History:
    2026-01-20 COD  Authored update workflow.
    2026-02-02 COD  Added dry-run pass.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Cleanup runs on every exit path
    - Install failures outrank cleanup failures
    - Dry runs touch neither disk nor package database
============================================================*/

use std::path::{Path, PathBuf};

use crate::apt;
use crate::config::SyncordConfig;
use crate::dpkg;
use crate::error::{Result, SyncordError};
use crate::logger::Logger;
use crate::release::ReleaseClient;

/// Terminal state of one update pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Installed version already matches the newest release.
    UpToDate { version: String },
    /// A newer release was downloaded and installed.
    Updated {
        previous: Option<String>,
        version: String,
        /// Resolved path the artifact was downloaded to.
        artifact: PathBuf,
        bytes: u64,
    },
    /// Versions were compared but nothing was touched.
    DryRun {
        installed: Option<String>,
        latest: String,
        update_available: bool,
    },
}

/// Run one update pass against the configured package.
pub async fn run_update(
    config: &SyncordConfig,
    logger: &Logger,
    dry_run: bool,
) -> Result<UpdateOutcome> {
    let installed =
        dpkg::installed_version(&config.package.status_program, &config.package.name).await?;
    match &installed {
        Some(version) => {
            logger.info("PROBE", format!("Currently Installed: Version {version}"));
        }
        None => {
            logger.info(
                "PROBE",
                format!("Package {} is not installed", config.package.name),
            );
        }
    }

    logger.info("RELEASE", "Looking for update");
    let client = ReleaseClient::new(&config.release)?;
    let release = client.resolve_latest().await?;
    logger.info("RELEASE", format!("Newest: Version {}", release.version));

    let update_available = installed.as_deref() != Some(release.version.as_str());
    if !update_available {
        logger.info("RELEASE", "Installed version up to date");
        if dry_run {
            return Ok(UpdateOutcome::DryRun {
                installed,
                latest: release.version,
                update_available: false,
            });
        }
        return Ok(UpdateOutcome::UpToDate {
            version: release.version,
        });
    }

    if dry_run {
        logger.info(
            "RELEASE",
            format!("Dry run: would update to Version {}", release.version),
        );
        return Ok(UpdateOutcome::DryRun {
            installed,
            latest: release.version,
            update_available: true,
        });
    }

    let artifact = config.artifact_path(&release.filename)?;
    let work: Result<u64> = async {
        logger.info("DOWNLOAD", format!("Downloading {}", release.url));
        let bytes = client.download(&release, &artifact, logger).await?;
        logger.info("DOWNLOAD", format!("Downloaded {}", release.url));

        logger.info(
            "INSTALL",
            format!(
                "Installing {} with {}",
                artifact.display(),
                config.package.install_program
            ),
        );
        apt::install_artifact(&config.package.install_program, &artifact, logger).await?;
        Ok(bytes)
    }
    .await;

    // The artifact never outlives the run, even when the install failed.
    let removal = remove_artifact(&artifact, logger).await;

    match (work, removal) {
        (Ok(bytes), Ok(())) => Ok(UpdateOutcome::Updated {
            previous: installed,
            version: release.version,
            artifact,
            bytes,
        }),
        (Ok(_), Err(cleanup_err)) => Err(cleanup_err),
        (Err(work_err), Ok(())) => Err(work_err),
        (Err(work_err), Err(cleanup_err)) => {
            logger.error(
                "CLEANUP",
                format!("Artifact cleanup also failed: {cleanup_err}"),
            );
            Err(work_err)
        }
    }
}

/// Remove the downloaded artifact; an already-absent file is not a failure.
async fn remove_artifact(path: &Path, logger: &Logger) -> Result<()> {
    logger.info("CLEANUP", format!("Deleting {}", path.display()));
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            logger.info("CLEANUP", format!("Deleted {}", path.display()));
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            logger.debug("CLEANUP", format!("{} already absent", path.display()));
            Ok(())
        }
        Err(err) => Err(SyncordError::Filesystem(format!(
            "Failed to delete {}: {err}",
            path.display()
        ))),
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use std::path::{Path, PathBuf};

    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn write_fake_program(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, script).expect("write fake program");
        let mut perms = std::fs::metadata(&path).expect("stat fake program").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod fake program");
        path
    }

    fn fake_dpkg(dir: &Path, version: Option<&str>) -> PathBuf {
        let script = match version {
            Some(version) => format!(
                "#!/bin/sh\nprintf 'Package: discord\\nStatus: install ok installed\\nVersion: {version}\\n'\n"
            ),
            None => "#!/bin/sh\necho \"dpkg-query: package 'discord' is not installed\" >&2\nexit 1\n"
                .to_string(),
        };
        write_fake_program(dir, "dpkg", &script)
    }

    fn test_config(
        server: &MockServer,
        download_dir: &Path,
        status_program: &Path,
        install_program: &Path,
    ) -> SyncordConfig {
        let mut config = SyncordConfig::default();
        config.package.status_program = status_program.to_str().expect("utf-8 path").into();
        config.package.install_program = install_program.to_str().expect("utf-8 path").into();
        config.release.endpoint = format!("{}/api/download", server.uri());
        config.release.download_dir = download_dir.to_path_buf();
        config
    }

    async fn mount_release(server: &MockServer, version: &str) {
        let target = format!("{}/apps/linux/{version}/discord-{version}.deb", server.uri());
        Mock::given(method("HEAD"))
            .and(url_path("/api/download"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", target.as_str()))
            .mount(server)
            .await;
        Mock::given(method("HEAD"))
            .and(url_path(format!("/apps/linux/{version}/discord-{version}.deb")))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn matching_versions_end_the_run_without_a_download() {
        let server = MockServer::start().await;
        mount_release(&server, "0.0.51").await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let dpkg = fake_dpkg(dir.path(), Some("0.0.51"));
        let apt = dir.path().join("apt-get-never-run");
        let config = test_config(&server, dir.path(), &dpkg, &apt);
        let logger = Logger::new(None, false).expect("logger");

        let outcome = run_update(&config, &logger, false).await.expect("run");
        assert_eq!(
            outcome,
            UpdateOutcome::UpToDate {
                version: "0.0.51".into()
            }
        );
    }

    #[tokio::test]
    async fn stale_install_downloads_installs_and_cleans_up() {
        let server = MockServer::start().await;
        mount_release(&server, "0.0.51").await;
        let body = vec![0xCD_u8; 2048];
        Mock::given(method("GET"))
            .and(url_path("/apps/linux/0.0.51/discord-0.0.51.deb"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let record = dir.path().join("invocation.txt");
        let dpkg = fake_dpkg(dir.path(), Some("0.0.50"));
        let apt = write_fake_program(
            dir.path(),
            "apt-get",
            &format!(
                "#!/bin/sh\nif [ -f \"$3\" ]; then echo present > {record}; fi\necho \"$@\" >> {record}\n",
                record = record.display()
            ),
        );
        let config = test_config(&server, dir.path(), &dpkg, &apt);
        let logger = Logger::new(None, false).expect("logger");

        let artifact = dir.path().join("discord-0.0.51.deb");
        let outcome = run_update(&config, &logger, false).await.expect("run");
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                previous: Some("0.0.50".into()),
                version: "0.0.51".into(),
                artifact: artifact.clone(),
                bytes: 2048,
            }
        );

        let invocation = std::fs::read_to_string(&record).expect("read invocation");
        assert!(invocation.starts_with("present\n"), "artifact must exist during install");
        assert!(invocation.contains(&format!("install -y {}", artifact.display())));
        assert!(!artifact.exists(), "artifact must be removed after the run");
    }

    #[tokio::test]
    async fn failed_install_still_removes_the_artifact() {
        let server = MockServer::start().await;
        mount_release(&server, "0.0.51").await;
        Mock::given(method("GET"))
            .and(url_path("/apps/linux/0.0.51/discord-0.0.51.deb"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 512]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let dpkg = fake_dpkg(dir.path(), Some("0.0.50"));
        let apt = write_fake_program(
            dir.path(),
            "apt-get",
            "#!/bin/sh\necho 'E: dpkg was interrupted' >&2\nexit 100\n",
        );
        let config = test_config(&server, dir.path(), &dpkg, &apt);
        let logger = Logger::new(None, false).expect("logger");

        let err = run_update(&config, &logger, false)
            .await
            .expect_err("install failure must surface");
        match err {
            SyncordError::CommandFailure { status, .. } => assert_eq!(status, 100),
            other => panic!("unexpected error: {other}"),
        }
        assert!(
            !dir.path().join("discord-0.0.51.deb").exists(),
            "artifact must be removed even when the install fails"
        );
    }

    #[tokio::test]
    async fn failed_install_outranks_a_failed_cleanup() {
        let server = MockServer::start().await;
        mount_release(&server, "0.0.51").await;
        Mock::given(method("GET"))
            .and(url_path("/apps/linux/0.0.51/discord-0.0.51.deb"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![3u8; 512]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let dpkg = fake_dpkg(dir.path(), Some("0.0.50"));
        // The installer swaps the artifact for a non-empty directory, so
        // the cleanup unlink fails as well.
        let apt = write_fake_program(
            dir.path(),
            "apt-get",
            "#!/bin/sh\nrm -f \"$3\"\nmkdir \"$3\"\ntouch \"$3/keep\"\necho 'E: dpkg was interrupted' >&2\nexit 100\n",
        );
        let config = test_config(&server, dir.path(), &dpkg, &apt);
        let log_path = dir.path().join("session.log.txt");
        let logger = Logger::new(Some(log_path.clone()), false).expect("logger");

        let err = run_update(&config, &logger, false)
            .await
            .expect_err("install failure must surface");
        match err {
            SyncordError::CommandFailure { status, .. } => assert_eq!(status, 100),
            other => panic!("unexpected error: {other}"),
        }
        let log = std::fs::read_to_string(&log_path).expect("read log");
        assert!(
            log.contains("Artifact cleanup also failed"),
            "cleanup failure must be logged alongside the install failure"
        );
        assert!(dir.path().join("discord-0.0.51.deb").is_dir());
    }

    #[tokio::test]
    async fn cleanup_failure_after_a_clean_install_surfaces() {
        let server = MockServer::start().await;
        mount_release(&server, "0.0.51").await;
        Mock::given(method("GET"))
            .and(url_path("/apps/linux/0.0.51/discord-0.0.51.deb"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![4u8; 256]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let dpkg = fake_dpkg(dir.path(), Some("0.0.50"));
        let apt = write_fake_program(
            dir.path(),
            "apt-get",
            "#!/bin/sh\nrm -f \"$3\"\nmkdir \"$3\"\ntouch \"$3/keep\"\nexit 0\n",
        );
        let config = test_config(&server, dir.path(), &dpkg, &apt);
        let logger = Logger::new(None, false).expect("logger");

        let err = run_update(&config, &logger, false)
            .await
            .expect_err("cleanup failure must surface");
        assert!(matches!(err, SyncordError::Filesystem(_)));
        assert!(dir.path().join("discord-0.0.51.deb").is_dir());
    }

    #[tokio::test]
    async fn absent_package_is_installed_fresh() {
        let server = MockServer::start().await;
        mount_release(&server, "0.0.51").await;
        Mock::given(method("GET"))
            .and(url_path("/apps/linux/0.0.51/discord-0.0.51.deb"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 256]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let dpkg = fake_dpkg(dir.path(), None);
        let apt = write_fake_program(dir.path(), "apt-get", "#!/bin/sh\nexit 0\n");
        let config = test_config(&server, dir.path(), &dpkg, &apt);
        let logger = Logger::new(None, false).expect("logger");

        let outcome = run_update(&config, &logger, false).await.expect("run");
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                previous: None,
                version: "0.0.51".into(),
                artifact: dir.path().join("discord-0.0.51.deb"),
                bytes: 256,
            }
        );
    }

    #[tokio::test]
    async fn any_version_difference_counts_as_an_update() {
        let server = MockServer::start().await;
        mount_release(&server, "0.0.51").await;
        Mock::given(method("GET"))
            .and(url_path("/apps/linux/0.0.51/discord-0.0.51.deb"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![2u8; 128]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        // Installed version sorts newer than the release; plain string
        // inequality still triggers the update.
        let dpkg = fake_dpkg(dir.path(), Some("0.0.52"));
        let apt = write_fake_program(dir.path(), "apt-get", "#!/bin/sh\nexit 0\n");
        let config = test_config(&server, dir.path(), &dpkg, &apt);
        let logger = Logger::new(None, false).expect("logger");

        let outcome = run_update(&config, &logger, false).await.expect("run");
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                previous: Some("0.0.52".into()),
                version: "0.0.51".into(),
                artifact: dir.path().join("discord-0.0.51.deb"),
                bytes: 128,
            }
        );
    }

    #[tokio::test]
    async fn dry_run_compares_versions_without_downloading() {
        let server = MockServer::start().await;
        mount_release(&server, "0.0.51").await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let dpkg = fake_dpkg(dir.path(), Some("0.0.50"));
        let apt = dir.path().join("apt-get-never-run");
        let config = test_config(&server, dir.path(), &dpkg, &apt);
        let logger = Logger::new(None, false).expect("logger");

        let outcome = run_update(&config, &logger, true).await.expect("run");
        assert_eq!(
            outcome,
            UpdateOutcome::DryRun {
                installed: Some("0.0.50".into()),
                latest: "0.0.51".into(),
                update_available: true,
            }
        );
    }

    #[tokio::test]
    async fn missing_status_program_aborts_before_any_network() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let absent = dir.path().join("no-such-dpkg");
        let apt = dir.path().join("apt-get-never-run");
        let config = test_config(&server, dir.path(), &absent, &apt);
        let logger = Logger::new(None, false).expect("logger");

        let err = run_update(&config, &logger, false)
            .await
            .expect_err("probe must fail");
        assert!(matches!(err, SyncordError::CommandMissing { .. }));
    }
}
