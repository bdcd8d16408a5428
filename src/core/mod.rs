/*!
# Core Module

Core functionality for the catalog pipeline: error types, non-fatal
diagnostics and BOM-aware source readers.
*/

pub mod errors;
pub mod fs_utils;

pub use errors::{
    CatalogError, CatalogResult, Diagnostic, DiagnosticCollector, ErrorLevel, SourceLocation,
};
pub use fs_utils::{read_source_file, read_source_lines, split_lines};
