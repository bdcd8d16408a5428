//! Documentation blocks of a defaults file.
//!
//! A block starts at a `! ### name` header and runs over blank lines and
//! comments until the first line of code. Several headers may share one
//! block, so other headers are skipped rather than ending it.

use std::collections::HashMap;

use crate::parser::patterns::{doc_header_for, doc_header_name, is_code, is_doc_body, is_header_like};

/// Text returned when a parameter has no documentation header
pub fn placeholder_doc(name: &str) -> String {
    format!("Documentation unavailable for {}.", name)
}

/// Linear scan for the first header of `name`
pub fn scan_doc_block<S: AsRef<str>>(lines: &[S], name: &str) -> String {
    let header = doc_header_for(name);
    match lines.iter().position(|line| header.is_match(line.as_ref())) {
        Some(start) => collect_block(lines, start),
        None => placeholder_doc(name),
    }
}

fn collect_block<S: AsRef<str>>(lines: &[S], start: usize) -> String {
    let mut doc = String::new();
    doc.push_str(lines[start].as_ref().trim());
    doc.push('\n');

    for line in &lines[start + 1..] {
        let line = line.as_ref();
        if is_code(line) {
            break;
        }
        if is_doc_body(line) {
            doc.push_str("  ");
            doc.push_str(line.trim());
            doc.push('\n');
        }
    }

    doc.trim().to_string()
}

/// Header offsets of one defaults file, computed once
pub struct DocBlockIndex<'a, S> {
    lines: &'a [S],
    headers: HashMap<String, usize>,
}

impl<'a, S: AsRef<str>> DocBlockIndex<'a, S> {
    pub fn new(lines: &'a [S]) -> Self {
        let mut headers = HashMap::new();
        for (idx, line) in lines.iter().enumerate() {
            if let Some(name) = doc_header_name(line.as_ref()) {
                headers.entry(name.to_lowercase()).or_insert(idx);
            }
        }
        Self { lines, headers }
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Same result as [`scan_doc_block`] without rescanning the file
    pub fn lookup(&self, name: &str) -> String {
        if name.contains(|c: char| c.is_whitespace() || c == '(') {
            return scan_doc_block(self.lines, name);
        }
        match self.headers.get(&name.to_lowercase()) {
            Some(&start) => collect_block(self.lines, start),
            None => placeholder_doc(name),
        }
    }
}

/// Names of the headers in the comment run directly above line `idx`
pub fn preceding_headers<S: AsRef<str>>(lines: &[S], idx: usize) -> Vec<String> {
    let mut names = Vec::new();
    for line in lines[..idx.min(lines.len())].iter().rev() {
        let line = line.as_ref();
        if is_code(line) {
            break;
        }
        if is_header_like(line) {
            if let Some(name) = doc_header_name(line) {
                names.push(name.to_string());
            }
        }
    }
    names
}
