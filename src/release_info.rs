/*============================================================
  Synavera Project: Syn-Cord
  Module: syncord_core::release_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structure describing a vendor release resolved from
    the download endpoint (final URL, version, filename).

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    None beyond std.

  Operational Scope:
    Produced by the release client and consumed by the update
    workflow and run report.

  Revision History:
    2026-01-19 COD  Introduced shared ReleaseInfo type.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Version and location travel together
============================================================*/

/// Captures the latest release advertised by the vendor endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Fully resolved artifact URL after redirects.
    pub url: String,
    /// Version segment extracted from the URL path.
    pub version: String,
    /// Artifact filename, last segment of the URL path.
    pub filename: String,
}

impl ReleaseInfo {
    pub fn new(url: String, version: String, filename: String) -> Self {
        Self {
            url,
            version,
            filename,
        }
    }
}
