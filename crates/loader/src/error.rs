//! Error types for the loader crate.

use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors surfaced through [`LoaderHandle`](crate::LoaderHandle) calls.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("invalid loader configuration: {0}")]
    Config(String),

    #[error("spool I/O failed at '{path}': {source}")]
    Spool {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("bulk loader is closed")]
    Closed,
}

impl LoaderError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn spool(path: impl Into<String>, source: io::Error) -> Self {
        Self::Spool {
            path: path.into(),
            source,
        }
    }
}

/// Stage of the flush pipeline where a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStage {
    Read,
    Upload,
    Load,
}

impl fmt::Display for FlushStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlushStage::Read => "read",
            FlushStage::Upload => "upload",
            FlushStage::Load => "load",
        };
        f.write_str(name)
    }
}

/// Failure of one flush operation.
///
/// Outcomes fan out to every subscriber, so the error is cloneable and
/// carries the underlying cause as a rendered message.
#[derive(Debug, Clone, Error)]
pub enum FlushError {
    /// The sealed spool file could not be read. Nothing was uploaded or
    /// deleted; the file, if it still exists, is untouched.
    #[error("spool read failed: {message}")]
    Read { message: String },

    /// The upload failed. The spool file stays on disk for a later
    /// flush or manual recovery.
    #[error("upload failed: {message}")]
    Upload { message: String },

    /// The COPY command failed after a successful upload. The object
    /// remains in the bucket and the local file is gone; reissue the
    /// COPY out of band to recover.
    #[error("load failed: {message}")]
    Load { message: String },
}

impl FlushError {
    pub fn read(path: &Path, source: impl fmt::Display) -> Self {
        Self::Read {
            message: format!("{}: {}", path.display(), source),
        }
    }

    pub fn upload(source: impl fmt::Display) -> Self {
        Self::Upload {
            message: source.to_string(),
        }
    }

    pub fn load(source: impl fmt::Display) -> Self {
        Self::Load {
            message: source.to_string(),
        }
    }

    pub fn stage(&self) -> FlushStage {
        match self {
            FlushError::Read { .. } => FlushStage::Read,
            FlushError::Upload { .. } => FlushStage::Upload,
            FlushError::Load { .. } => FlushStage::Load,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FlushError::Read { message }
            | FlushError::Upload { message }
            | FlushError::Load { message } => message,
        }
    }
}
