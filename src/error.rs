//! Error types shared by the scheduler and the registry collaborators.

use std::path::PathBuf;

/// Why one package was skipped. Never escapes the scheduler's item boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("package name is not a valid record file name component")]
    InvalidName,

    #[error("failed to resolve latest version")]
    Resolution,

    #[error("download produced no artifact")]
    Fetch,

    #[error("failed to unpack artifact: {0}")]
    Unpack(String),

    #[error("no parseable python files")]
    EmptyExtraction,

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl SkipReason {
    pub fn unexpected(err: anyhow::Error) -> Self {
        SkipReason::Unexpected(format!("{err:#}"))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::InvalidName => "invalid_name",
            SkipReason::Resolution => "resolution",
            SkipReason::Fetch => "fetch",
            SkipReason::Unpack(_) => "unpack",
            SkipReason::EmptyExtraction => "empty_extraction",
            SkipReason::Unexpected(_) => "unexpected",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UnpackError {
    #[error("open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("zip archive {path}: {source}")]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("tar archive {path}: {source}")]
    Tar {
        path: PathBuf,
        source: std::io::Error,
    },
}
