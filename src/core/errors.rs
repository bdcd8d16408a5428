/*!
# Error System for Inlist Catalog

Fatal conditions are typed as [`CatalogError`]; non-fatal findings of the
pipeline (skipped files, literal fallbacks, name mismatches) are collected as
[`Diagnostic`]s so a build can report them without aborting.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Fatal errors of the catalog pipeline and store
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Could not locate the installation root: {0}")]
    ConfigDirectoryNotFound(String),

    #[error("Continuation marker on line {line} has no following line")]
    MalformedContinuation { line: usize },

    #[error("Invalid version marker in {path}: {reason}")]
    InvalidVersion { path: PathBuf, reason: String },

    #[error("No parameter named '{name}' in the catalog")]
    NotFound { name: String },

    #[error("No catalog found at {path}")]
    NoCatalog { path: PathBuf },

    #[error("Query has {placeholders} placeholder(s) but {terms} search term(s) were supplied")]
    PlaceholderMismatch { placeholders: usize, terms: usize },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid catalog row for '{name}': {reason}")]
    InvalidRow { name: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Lookup misses are the only errors a caller may want to treat as "absent"
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "ERROR"),
            ErrorLevel::Warning => write!(f, "WARNING"),
            ErrorLevel::Info => write!(f, "INFO"),
        }
    }
}

/// Where in the input a diagnostic was raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => write!(f, "{}", self.file),
        }
    }
}

/// Non-fatal finding of the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub level: ErrorLevel,
    pub group: Option<String>,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, level: ErrorLevel) -> Self {
        Self {
            message: message.into(),
            level,
            group: None,
            location: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ErrorLevel::Warning)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ErrorLevel::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ErrorLevel::Error)
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.level)?;
        if let Some(group) = &self.group {
            write!(f, " {}", group)?;
        }
        if let Some(location) = &self.location {
            write!(f, " {}", location)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Diagnostic collection and reporting
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == ErrorLevel::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == ErrorLevel::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(ErrorLevel::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(ErrorLevel::Warning)
    }

    fn count(&self, level: ErrorLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn merge(&mut self, other: DiagnosticCollector) {
        self.diagnostics.extend(other.diagnostics);
    }
}

impl fmt::Display for DiagnosticCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_counts() {
        let mut collector = DiagnosticCollector::new();
        collector.push(Diagnostic::warning("literal kept as string"));
        collector.push(Diagnostic::error("file aborted").with_group("controls"));
        collector.push(Diagnostic::info("line skipped"));

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.error_count(), 1);
        assert_eq!(collector.warning_count(), 1);
        assert!(collector.has_errors());
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::warning("mismatch")
            .with_group("star_job")
            .with_location(SourceLocation::new("star_job.defaults", Some(12)));
        assert_eq!(
            diagnostic.to_string(),
            "[WARNING] star_job star_job.defaults:12: mismatch"
        );
    }

    #[test]
    fn test_not_found_is_distinct() {
        let miss = CatalogError::NotFound {
            name: "x".to_string(),
        };
        let missing_store = CatalogError::NoCatalog {
            path: PathBuf::from("/nowhere"),
        };
        assert!(miss.is_not_found());
        assert!(!missing_store.is_not_found());
    }
}
