use super::{ArtifactFetcher, list_files};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Fetches artifacts by shelling out to `pip download`.
#[derive(Debug, Clone)]
pub struct PipFetcher {
    program: String,
}

impl PipFetcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, package: &str, version: &str, dest: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("download")
            .arg(format!("{package}=={version}"))
            .arg("--no-deps")
            .arg("-d")
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl Default for PipFetcher {
    fn default() -> Self {
        Self::new("pip")
    }
}

impl ArtifactFetcher for PipFetcher {
    fn fetch(&self, package: &str, version: &str, dest: &Path) -> Vec<PathBuf> {
        match self.command(package, version, dest).status() {
            Ok(status) if !status.success() => {
                debug!(package, version, "pip download exited with {status}");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(package, "failed to run {}: {err}", self.program);
                return Vec::new();
            }
        }
        list_files(dest)
    }
}
