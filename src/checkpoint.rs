use crate::util;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persisted index of the next package to process.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable or malformed checkpoints all resume from 0.
    pub fn load(&self) -> usize {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(err) => {
                warn!("unreadable checkpoint {}: {err}; starting at 0", self.path.display());
                return 0;
            }
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "invalid checkpoint {} ({:?}); starting at 0",
                    self.path.display(),
                    raw.trim()
                );
                0
            }
        }
    }

    pub fn save(&self, next: usize) -> Result<()> {
        util::write_atomic(&self.path, next.to_string().as_bytes())
    }

    pub fn reset(&self) -> Result<()> {
        self.save(0)
    }
}
