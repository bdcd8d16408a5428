/*!
# Defaults Module

Second stage of the pipeline: reads a group's defaults file, infers each
parameter's default and type from its literal, attaches the documentation
block written above it and merges the result into the declared records.
*/

pub mod doc_block;
pub mod merger;

pub use doc_block::{placeholder_doc, preceding_headers, scan_doc_block, DocBlockIndex};
pub use merger::{merge_defaults, parse_assignment, Assignment, MergeOutcome};
