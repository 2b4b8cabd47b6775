use crate::model::SymbolTable;
use anyhow::Result;
use std::path::Path;
use tracing::debug;

pub mod python;
pub mod scan;

/// Reduces a directory of python sources to one merged [`SymbolTable`].
pub struct SymbolExtractor {
    python: python::PythonExtractor,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub files: usize,
    pub parsed: usize,
    pub failed: usize,
}

impl SymbolExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            python: python::PythonExtractor::new()?,
        })
    }

    /// Walk `root` and merge every module's symbols, first definition wins.
    /// An empty table means nothing was extracted.
    pub fn extract_dir(&mut self, root: &Path) -> Result<SymbolTable> {
        self.extract_dir_with_stats(root).map(|(table, _)| table)
    }

    pub fn extract_dir_with_stats(&mut self, root: &Path) -> Result<(SymbolTable, ExtractStats)> {
        let mut merged = SymbolTable::new();
        let mut stats = ExtractStats::default();
        for file in scan::scan_sources(root)? {
            stats.files += 1;
            let source = match crate::util::read_lossy(&file.abs_path) {
                Ok(source) => source,
                Err(err) => {
                    debug!(path = %file.rel_path, "skipping unreadable file: {err:#}");
                    stats.failed += 1;
                    continue;
                }
            };
            match self.python.extract(&source) {
                Some(table) => {
                    stats.parsed += 1;
                    merged.merge_first_wins(table);
                }
                None => {
                    debug!(path = %file.rel_path, "skipping file with syntax errors");
                    stats.failed += 1;
                }
            }
        }
        debug!(
            files = stats.files,
            parsed = stats.parsed,
            failed = stats.failed,
            symbols = merged.len(),
            "extracted {}",
            root.display()
        );
        Ok((merged, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Signature;
    use std::fs;

    #[test]
    fn counts_parsed_and_failed_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.py"), "def ok(a):\n    pass\n").unwrap();
        fs::write(dir.path().join("bad.py"), "def nope(:\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "def ignored(): pass\n").unwrap();

        let mut extractor = SymbolExtractor::new().unwrap();
        let (table, stats) = extractor.extract_dir_with_stats(dir.path()).unwrap();
        assert_eq!(
            stats,
            ExtractStats {
                files: 2,
                parsed: 1,
                failed: 1
            }
        );
        assert_eq!(table.get("ok"), Some(&Signature::Function(vec!["a".into()])));
        assert!(!table.contains("ignored"));
    }
}
