//! Error kinds for a single build or patch run.
//!
//! Every variant is terminal: nothing in the crate retries or recovers.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Failure of one kernel-builder run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("download of '{url}' failed: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to get absolute path for '{}': {source}", path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output dir '{}': {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("patches directory does not exist: '{}'", path.display())]
    MissingPatchesDir { path: PathBuf },

    #[error("container image build failed ({status})")]
    ImageBuild { status: ExitStatus },

    #[error("container run failed ({status})")]
    ContainerRun { status: ExitStatus },

    #[error("failed to create temp file for download: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("checksum mismatch for '{}': expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("container engine '{engine}' not found in PATH (install docker or podman, or set KERNEL_BUILDER_ENGINE)")]
    EngineNotFound { engine: String },

    #[error("failed to start '{program}': {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
