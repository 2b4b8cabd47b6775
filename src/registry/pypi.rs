use super::{ArtifactFetcher, MetadataResolver};
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use ureq::{Agent, AgentBuilder};

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    filename: String,
    url: String,
    packagetype: String,
    #[serde(default)]
    yanked: bool,
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    info: ProjectInfo,
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

/// Client for the PyPI JSON API.
///
/// Metadata lookups use a short timeout; artifact downloads get their own,
/// longer one.
pub struct PypiClient {
    index_url: String,
    metadata: Agent,
    download: Agent,
}

impl PypiClient {
    pub fn new(
        index_url: &str,
        resolve_timeout: Duration,
        download_timeout: Option<Duration>,
    ) -> Self {
        let user_agent = concat!("sigdb/", env!("CARGO_PKG_VERSION"));
        let metadata = AgentBuilder::new()
            .timeout(resolve_timeout)
            .user_agent(user_agent)
            .build();
        let mut download = AgentBuilder::new().user_agent(user_agent);
        if let Some(timeout) = download_timeout {
            download = download.timeout(timeout);
        }
        Self {
            index_url: index_url.trim_end_matches('/').to_string(),
            metadata,
            download: download.build(),
        }
    }

    fn project_url(&self, package: &str, version: Option<&str>) -> String {
        match version {
            Some(version) => format!("{}/{}/{}/json", self.index_url, package, version),
            None => format!("{}/{}/json", self.index_url, package),
        }
    }

    fn get_project(&self, url: &str) -> Result<ProjectResponse> {
        let response = self.metadata.get(url).call().map_err(|err| match err {
            ureq::Error::Status(status, _) => anyhow!("{url} returned HTTP {status}"),
            ureq::Error::Transport(transport) => anyhow!("{url}: {transport}"),
        })?;
        response
            .into_json::<ProjectResponse>()
            .with_context(|| format!("decode {url}"))
    }

    fn download_to(&self, file: &ReleaseFile, dest: &Path) -> Result<PathBuf> {
        let name = crate::util::sanitize_file_component(&file.filename);
        let target = dest.join(name);
        let response = self
            .download
            .get(&file.url)
            .call()
            .map_err(|err| anyhow!("download {}: {err}", file.url))?;
        let out = File::create(&target).with_context(|| format!("create {}", target.display()))?;
        let mut writer = BufWriter::new(out);
        std::io::copy(&mut response.into_reader(), &mut writer)
            .with_context(|| format!("write {}", target.display()))?;
        Ok(target)
    }
}

/// Wheels first, then source distributions; yanked files never.
fn pick_release_file(files: &[ReleaseFile]) -> Option<&ReleaseFile> {
    let candidates = || files.iter().filter(|file| !file.yanked);
    candidates()
        .find(|file| file.packagetype == "bdist_wheel")
        .or_else(|| candidates().find(|file| file.packagetype == "sdist"))
}

impl MetadataResolver for PypiClient {
    fn resolve(&self, package: &str) -> Option<String> {
        let url = self.project_url(package, None);
        match self.get_project(&url) {
            Ok(project) => {
                let version = project.info.version.trim().to_string();
                if version.is_empty() { None } else { Some(version) }
            }
            Err(err) => {
                debug!(package, "resolve failed: {err:#}");
                None
            }
        }
    }
}

impl ArtifactFetcher for PypiClient {
    fn fetch(&self, package: &str, version: &str, dest: &Path) -> Vec<PathBuf> {
        let url = self.project_url(package, Some(version));
        let project = match self.get_project(&url) {
            Ok(project) => project,
            Err(err) => {
                warn!(package, "release lookup failed: {err:#}");
                return Vec::new();
            }
        };
        let Some(file) = pick_release_file(&project.urls) else {
            debug!(package, version, "no wheel or sdist published");
            return Vec::new();
        };
        match self.download_to(file, dest) {
            Ok(path) => vec![path],
            Err(err) => {
                warn!(package, "{err:#}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(filename: &str, packagetype: &str, yanked: bool) -> ReleaseFile {
        ReleaseFile {
            filename: filename.to_string(),
            url: format!("https://files.example/{filename}"),
            packagetype: packagetype.to_string(),
            yanked,
        }
    }

    #[test]
    fn prefers_wheels_over_sdists() {
        let files = vec![
            release("demo-1.0.tar.gz", "sdist", false),
            release("demo-1.0-py3-none-any.whl", "bdist_wheel", false),
        ];
        let picked = pick_release_file(&files).unwrap();
        assert_eq!(picked.filename, "demo-1.0-py3-none-any.whl");
    }

    #[test]
    fn skips_yanked_files() {
        let files = vec![
            release("demo-1.0-py3-none-any.whl", "bdist_wheel", true),
            release("demo-1.0.tar.gz", "sdist", false),
            release("demo-1.0.exe", "bdist_wininst", false),
        ];
        assert_eq!(pick_release_file(&files).unwrap().filename, "demo-1.0.tar.gz");
        assert!(pick_release_file(&files[..1]).is_none());
    }

    #[test]
    fn decodes_project_json() {
        let body = r#"{
            "info": {"version": "2.32.3", "name": "requests"},
            "urls": [{
                "filename": "requests-2.32.3.tar.gz",
                "url": "https://x/y",
                "packagetype": "sdist"
            }]
        }"#;
        let project: ProjectResponse = serde_json::from_str(body).unwrap();
        assert_eq!(project.info.version, "2.32.3");
        assert_eq!(project.urls.len(), 1);
        assert!(!project.urls[0].yanked);
    }

    #[test]
    fn builds_project_urls() {
        let client = PypiClient::new("https://pypi.org/pypi/", Duration::from_secs(1), None);
        assert_eq!(client.project_url("six", None), "https://pypi.org/pypi/six/json");
        assert_eq!(
            client.project_url("six", Some("1.17.0")),
            "https://pypi.org/pypi/six/1.17.0/json"
        );
    }

    #[test]
    fn unreachable_index_resolves_to_none() {
        let client = PypiClient::new("http://127.0.0.1:9", Duration::from_millis(200), None);
        assert_eq!(client.resolve("requests"), None);
        let dir = tempfile::tempdir().unwrap();
        assert!(client.fetch("requests", "1.0", dir.path()).is_empty());
    }
}
