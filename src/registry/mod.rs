//! Collaborators that reach outside the process: version lookup, artifact
//! download and archive unpacking.
//!
//! None of these may fail past their boundary except the unpacker, whose
//! error is classified by the scheduler as an unpack skip.

use crate::error::UnpackError;
use std::path::{Path, PathBuf};

pub mod archive;
pub mod pip;
pub mod pypi;

pub use archive::StandardUnpacker;
pub use pip::PipFetcher;
pub use pypi::PypiClient;

pub trait MetadataResolver {
    /// Latest released version of `package`, or `None` on any failure.
    fn resolve(&self, package: &str) -> Option<String>;
}

pub trait ArtifactFetcher {
    /// Download one release artifact of `package` at `version` into `dest`.
    /// Returns the downloaded files; empty on failure.
    fn fetch(&self, package: &str, version: &str, dest: &Path) -> Vec<PathBuf>;
}

pub trait ArchiveUnpacker {
    /// Unpack `archive` into `dest`. Unsupported formats leave `dest` empty
    /// and return `Ok(())`.
    fn unpack(&self, archive: &Path, dest: &Path) -> Result<(), UnpackError>;
}

/// Regular files directly inside `dir`, sorted by path.
pub(crate) fn list_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}
