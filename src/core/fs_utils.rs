//! File system utility helpers (BOM-aware readers, etc.)
use std::fs;
use std::path::Path;

use super::errors::{CatalogError, CatalogResult};

/// Read a source file as UTF-8 text, stripping UTF-8 BOM if present.
pub fn read_source_file(path: &Path) -> CatalogResult<String> {
    let mut content = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    if content.starts_with('\u{FEFF}') {
        content = content.trim_start_matches('\u{FEFF}').to_string();
    }
    Ok(content)
}

/// Read a source file and split it into physical lines without terminators.
pub fn read_source_lines(path: &Path) -> CatalogResult<Vec<String>> {
    let content = read_source_file(path)?;
    Ok(split_lines(&content))
}

/// Splits text into physical lines, dropping `\r` of CRLF endings.
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}
