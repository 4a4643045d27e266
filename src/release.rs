/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::release
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Resolve the newest release advertised by the vendor
    download endpoint and stream its artifact to disk.

  Security / Safety Notes:
    Performs read-only HTTPS requests against the configured
    endpoint. No credentials are transmitted. Redirects are
    capped to prevent loops.

  Dependencies:
    reqwest for HTTP, urlencoding for query values, tokio::fs
    for streaming writes.

  Operational Scope:
    Supplies the update workflow with the latest version and,
    when stale, the downloaded artifact path.

  Revision History:
    2026-01-19 COD  Implemented redirect-based release lookup.
    2026-02-02 COD  Streamed downloads with progress strides.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Bounded redirects with explicit error paths
    - Streaming writes, never whole-artifact buffering
    - Progress visibility at a fixed byte stride
============================================================*/

use std::path::Path;
use std::time::Duration;

use reqwest::redirect::Policy;
use tokio::io::AsyncWriteExt;
use urlencoding::encode;

use crate::config::ReleaseConfig;
use crate::error::{Result, SyncordError};
use crate::logger::Logger;
use crate::release_info::ReleaseInfo;

const USER_AGENT: &str = "Syn-Cord-Core/0.3 (linux)";
const MAX_REDIRECTS: usize = 10;

/// Client for the vendor download endpoint.
#[derive(Clone)]
pub struct ReleaseClient {
    client: reqwest::Client,
    endpoint: String,
    platform: String,
    format: String,
    progress_stride: u64,
}

impl ReleaseClient {
    /// Construct a new client from configuration.
    pub fn new(config: &ReleaseConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::limited(MAX_REDIRECTS));
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|err| SyncordError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            platform: config.platform.clone(),
            format: config.format.clone(),
            progress_stride: config.chunk_size_mib.max(1).saturating_mul(1024 * 1024),
        })
    }

    fn compose_url(&self) -> String {
        format!(
            "{}?platform={}&format={}",
            self.endpoint,
            encode(&self.platform),
            encode(&self.format)
        )
    }

    /// Resolve the newest release by following the endpoint's redirect chain
    /// and decoding the final artifact URL.
    pub async fn resolve_latest(&self) -> Result<ReleaseInfo> {
        let url = self.compose_url();
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|err| SyncordError::Network(format!("Release lookup {url} failed: {err}")))?;

        if !response.status().is_success() {
            return Err(SyncordError::Network(format!(
                "Release lookup {url} returned status {}",
                response.status()
            )));
        }

        parse_release_url(response.url().as_str())
    }

    /// Stream the artifact to `destination`, logging progress every stride.
    /// Returns the number of bytes written.
    pub async fn download(
        &self,
        release: &ReleaseInfo,
        destination: &Path,
        logger: &Logger,
    ) -> Result<u64> {
        let mut response = self
            .client
            .get(&release.url)
            .send()
            .await
            .map_err(|err| {
                SyncordError::Network(format!("Download of {} failed: {err}", release.url))
            })?;

        if !response.status().is_success() {
            return Err(SyncordError::Network(format!(
                "Download of {} returned status {}",
                release.url,
                response.status()
            )));
        }

        let total = response.content_length();
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                SyncordError::Filesystem(format!(
                    "Failed to create download directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        let mut file = tokio::fs::File::create(destination).await.map_err(|err| {
            SyncordError::Filesystem(format!(
                "Failed to create artifact {}: {err}",
                destination.display()
            ))
        })?;

        let mut downloaded: u64 = 0;
        let mut next_mark = self.progress_stride;
        let mut last_logged = u64::MAX;
        while let Some(chunk) = response.chunk().await.map_err(|err| {
            SyncordError::Network(format!("Download of {} interrupted: {err}", release.url))
        })? {
            file.write_all(&chunk).await.map_err(|err| {
                SyncordError::Filesystem(format!(
                    "Failed to write artifact {}: {err}",
                    destination.display()
                ))
            })?;
            downloaded = downloaded.saturating_add(chunk.len() as u64);
            if downloaded >= next_mark {
                logger.info("DOWNLOAD", format_progress(downloaded, total));
                last_logged = downloaded;
                while next_mark <= downloaded {
                    next_mark = next_mark.saturating_add(self.progress_stride);
                }
            }
        }

        file.flush().await.map_err(|err| {
            SyncordError::Filesystem(format!(
                "Failed to flush artifact {}: {err}",
                destination.display()
            ))
        })?;
        file.sync_all().await.map_err(|err| {
            SyncordError::Filesystem(format!(
                "Failed to sync artifact {}: {err}",
                destination.display()
            ))
        })?;

        if last_logged != downloaded {
            logger.info("DOWNLOAD", format_progress(downloaded, total));
        }
        Ok(downloaded)
    }
}

/// Decode version and filename from a resolved artifact URL.
///
/// The vendor encodes both in fixed path positions
/// (`.../apps/<platform>/<version>/<filename>`); anything shorter or with
/// empty segments is rejected rather than guessed at.
fn parse_release_url(url: &str) -> Result<ReleaseInfo> {
    let segments: Vec<&str> = url.split('/').collect();
    if segments.len() < 7 {
        return Err(SyncordError::Release(format!(
            "Release URL has unexpected shape: {url}"
        )));
    }
    let version = segments[5];
    let filename = segments[6];
    if version.is_empty() || filename.is_empty() {
        return Err(SyncordError::Release(format!(
            "Release URL is missing version or filename: {url}"
        )));
    }
    if filename == "." || filename == ".." {
        return Err(SyncordError::Release(format!(
            "Release URL yields unusable filename `{filename}`: {url}"
        )));
    }
    Ok(ReleaseInfo::new(
        url.to_string(),
        version.to_string(),
        filename.to_string(),
    ))
}

fn format_progress(downloaded: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => {
            let percent = downloaded as f64 / total as f64 * 100.0;
            format!("Download Progress: {downloaded} B / {total} B | {percent:.2}%")
        }
        _ => format!("Download Progress: {downloaded} B"),
    }
}
