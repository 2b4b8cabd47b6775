use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::warn;

static SOURCE_EXTENSIONS: &[&str] = &["py"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub rel_path: String,
    pub abs_path: PathBuf,
}

/// List every python source file under `root` in top-down walk order: the
/// files of a directory (by name) come before anything inside its
/// subdirectories, and sibling subdirectories are visited by name.
pub fn scan_sources(root: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    if !root.is_dir() {
        return Ok(files);
    }
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                warn!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if !is_source_file(path) {
            continue;
        }
        let rel_path = crate::util::normalize_rel_path(root, path)?;
        files.push(SourceFile {
            rel_path,
            abs_path: path.to_path_buf(),
        });
    }
    files.sort_by_cached_key(|file| walk_order_key(&file.rel_path));
    Ok(files)
}

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Directory components first, so an ancestor's files (a prefix) sort before
/// anything nested below it.
fn walk_order_key(rel_path: &str) -> (Vec<String>, String) {
    let mut parts: Vec<String> = rel_path.split('/').map(str::to_string).collect();
    let file = parts.pop().unwrap_or_default();
    (parts, file)
}
