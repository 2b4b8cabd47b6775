use crate::model::SymbolTable;
use crate::util;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Write-once store of extraction records, one JSON file per
/// (package, encoded version) in a flat directory.
///
/// A record's existence is the cache hit; contents are never read back.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("create dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn file_name(package: &str, encoded_version: &str) -> String {
        format!(
            "{}_{}.json",
            util::sanitize_file_component(package),
            util::sanitize_file_component(encoded_version)
        )
    }

    pub fn record_path(&self, package: &str, encoded_version: &str) -> PathBuf {
        self.dir.join(Self::file_name(package, encoded_version))
    }

    pub fn exists(&self, package: &str, encoded_version: &str) -> bool {
        self.record_path(package, encoded_version).is_file()
    }

    /// Persist `table` for the key. Callers check [`exists`](Self::exists) first.
    pub fn write(
        &self,
        package: &str,
        encoded_version: &str,
        table: &SymbolTable,
    ) -> Result<PathBuf> {
        let path = self.record_path(package, encoded_version);
        let mut body = serde_json::to_vec_pretty(table)
            .with_context(|| format!("serialize record for {package}"))?;
        body.push(b'\n');
        util::write_atomic(&path, &body)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Signature;

    #[test]
    fn record_names_embed_package_and_version() {
        assert_eq!(
            ArtifactCache::file_name("requests", "v000200320003"),
            "requests_v000200320003.json"
        );
        assert_eq!(
            ArtifactCache::file_name("../evil", "v000100000000"),
            ".._evil_v000100000000.json"
        );
    }

    #[test]
    fn write_then_exists() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArtifactCache::open(dir.path().join("lib_db")).unwrap();
        assert!(!cache.exists("six", "v000100170000"));

        let mut table = SymbolTable::new();
        table.insert_first("PY3", Signature::Variable);
        let path = cache.write("six", "v000100170000", &table).unwrap();

        assert!(cache.exists("six", "v000100170000"));
        assert!(!cache.exists("six", "v000100160000"));
        let body = std::fs::read_to_string(path).unwrap();
        assert_eq!(body, "{\n  \"PY3\": null\n}\n");
    }
}
