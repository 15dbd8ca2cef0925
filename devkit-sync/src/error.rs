//! Error types for devkit-sync.

use std::path::PathBuf;

use thiserror::Error;

use devkit_core::ConfigError;
use devkit_renderer::RenderError;

/// Failures of the local version-control adapter.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The VCS program could not be started at all.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited non-zero. `command` is credential-redacted.
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Filesystem failure while preparing the working copy.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reported by (or while talking to) the hosting API.
#[derive(Debug, Error)]
pub enum HostingError {
    /// The API answered with a non-success HTTP status.
    #[error("{method} {url} returned {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset…).
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("failed to decode response of {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl HostingError {
    /// HTTP status when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HostingError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// All errors that can arise while processing one repository.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An error from the fleet config.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A version-control command failed.
    #[error("git error: {0}")]
    Vcs(#[from] VcsError),

    /// A hosting API call failed.
    #[error("hosting API error: {0}")]
    Hosting(#[from] HostingError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `composer.json` could not be read or written as JSON.
    #[error("composer.json error at {path}: {source}")]
    Composer {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The skeleton directory does not exist.
    #[error("skeleton directory not found at {path}")]
    SkeletonNotFound { path: PathBuf },

    /// The working copy does not have the layout a mutation requires.
    #[error("unexpected layout in {path}: {reason}")]
    Layout { path: PathBuf, reason: String },

    /// Owner or repository name would resolve outside the clone root.
    #[error("refusing to check out {slug}: names must be single path segments")]
    UnsafeSlug { slug: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
