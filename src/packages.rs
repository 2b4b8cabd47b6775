use anyhow::Result;
use std::path::Path;

/// Read the newline-delimited package list. Lines are trimmed and blank lines
/// dropped; the order of the rest is the order checkpoints index into.
pub fn read_package_list(path: &Path) -> Result<Vec<String>> {
    let raw = crate::util::read_to_string(path)?;
    Ok(parse_package_list(&raw))
}

pub fn parse_package_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
