use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path};

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Read a source file, replacing invalid UTF-8 sequences instead of failing.
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn normalize_rel_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).with_context(|| {
        format!("strip prefix {} from {}", root.display(), path.display())
    })?;
    Ok(normalize_path(rel))
}

pub fn normalize_path(path: &Path) -> String {
    let mut parts = Vec::new();
    for comp in path.components() {
        match comp {
            Component::Normal(os) => parts.push(os.to_string_lossy().to_string()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::CurDir => {}
            _ => {}
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    Ok(())
}

/// Write `contents` next to `path` and rename it into place, so readers see
/// either the old file or the complete new one.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("write temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync temp file for {}", path.display()))?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("rename into {}", path.display()))?;
    Ok(())
}

fn is_safe_file_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')
}

/// True when [`sanitize_file_component`] would return `raw` unchanged.
pub fn is_safe_file_component(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(is_safe_file_char) && !raw.chars().all(|ch| ch == '.')
}

/// Keep the characters that are safe in a flat file name and replace the rest.
pub fn sanitize_file_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|ch| if is_safe_file_char(ch) { ch } else { '_' })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|ch| ch == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_relative_paths() {
        let root = Path::new("/tmp/root");
        let rel = normalize_rel_path(root, Path::new("/tmp/root/pkg/./mod.py")).unwrap();
        assert_eq!(rel, "pkg/mod.py");
        assert_eq!(normalize_path(Path::new("")), ".");
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("value.txt");
        write_atomic(&path, b"1").unwrap();
        write_atomic(&path, b"22").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "22");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn sanitizes_file_components() {
        assert_eq!(sanitize_file_component("requests"), "requests");
        assert_eq!(sanitize_file_component("zope.interface"), "zope.interface");
        assert_eq!(sanitize_file_component("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_file_component(".."), "_");
        assert_eq!(sanitize_file_component(""), "_");
    }

    #[test]
    fn safe_components_survive_sanitizing() {
        for raw in ["requests", "zope.interface", "typing_extensions", "Flask-Login"] {
            assert!(is_safe_file_component(raw), "{raw}");
            assert_eq!(sanitize_file_component(raw), raw);
        }
        for raw in ["a/b", "a b", "", "..", "naïve", " padded"] {
            assert!(!is_safe_file_component(raw), "{raw:?}");
        }
    }

    #[test]
    fn lossy_read_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.py");
        fs::write(&path, b"x = '\xe9'\n").unwrap();
        let text = read_lossy(&path).unwrap();
        assert!(text.starts_with("x = '"));
    }
}
