use crate::types::InstallPhase;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Unsupported platform: {os}-{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Invalid release version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Download failed: {status}")]
    DownloadFailed { url: String, status: StatusCode },

    #[error("Too many redirects (limit {limit}) while fetching {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("Transport error: {source}")]
    TransportError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("{context}: {source}")]
    ArchiveWrite {
        url: String,
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract: {cause}")]
    ExtractionFailed { cause: String },

    #[error("Expected binary not found after extraction: {}", .path.display())]
    InstalledBinaryMissing { path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        InstallError::Io {
            context: context.into(),
            source,
        }
    }

    /// Local write failure while storing the download for `url`.
    pub fn archive_write(url: &str, context: impl Into<String>, source: std::io::Error) -> Self {
        InstallError::ArchiveWrite {
            url: url.to_string(),
            context: context.into(),
            source,
        }
    }

    /// Phase the run was in when this error was raised.
    pub fn phase(&self) -> InstallPhase {
        match self {
            InstallError::UnsupportedPlatform { .. } | InstallError::InvalidVersion { .. } => {
                InstallPhase::Resolving
            }
            InstallError::DownloadFailed { .. }
            | InstallError::TooManyRedirects { .. }
            | InstallError::TransportError { .. }
            | InstallError::Timeout { .. }
            | InstallError::ArchiveWrite { .. } => InstallPhase::Fetching,
            InstallError::ExtractionFailed { .. }
            | InstallError::InstalledBinaryMissing { .. }
            | InstallError::Io { .. } => InstallPhase::Installing,
        }
    }

    /// URL that was being fetched, for fetch-phase errors.
    pub fn url(&self) -> Option<&str> {
        match self {
            InstallError::DownloadFailed { url, .. }
            | InstallError::TooManyRedirects { url, .. }
            | InstallError::TransportError { url, .. }
            | InstallError::Timeout { url, .. }
            | InstallError::ArchiveWrite { url, .. } => Some(url),
            _ => None,
        }
    }
}

pub type InstallResult<T> = std::result::Result<T, InstallError>;
