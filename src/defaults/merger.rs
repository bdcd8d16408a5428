//! Defaults merger: folds a group's defaults file into its declared records.

use serde::Serialize;
use tracing::{debug, warn};

use super::doc_block::{preceding_headers, DocBlockIndex};
use crate::catalog::group::GroupRecords;
use crate::catalog::record::ParameterRecord;
use crate::core::{Diagnostic, DiagnosticCollector, SourceLocation};
use crate::parser::literal::classify_literal;
use crate::parser::patterns::{
    count_top_level_commas, is_blank, is_comment, split_parenthetical_suffix, strip_inline_comment,
};

/// What one defaults pass did to the arena
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub defaults_seen: usize,
    pub updated: usize,
    pub appended: usize,
}

/// One `name(idx) = value ! comment` line, taken apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub name: &'a str,
    /// Rank implied by the index suffix of the target, 0 without one
    pub index_dim: usize,
    pub literal: &'a str,
}

/// Splits an assignment line on its first `=`
pub fn parse_assignment(line: &str) -> Option<Assignment<'_>> {
    let (target, value_expr) = line.split_once('=')?;
    let (name, suffix) = split_parenthetical_suffix(target.trim());
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let index_dim = suffix
        .map(|s| {
            let inner = s.trim_start_matches('(').trim_end_matches(')');
            count_top_level_commas(inner) + 1
        })
        .unwrap_or(0);
    let literal = strip_inline_comment(value_expr).trim();
    Some(Assignment {
        name,
        index_dim,
        literal,
    })
}

/// Merges the defaults of one group into `records`.
///
/// Each assignment line bumps the group's order counter. A known name is
/// updated in place; an unknown one is appended with the rank implied by its
/// index suffix. The result depends only on `lines` and the starting records.
pub fn merge_defaults<S: AsRef<str>>(
    lines: &[S],
    records: &mut GroupRecords,
    source: &str,
    diagnostics: &mut DiagnosticCollector,
) -> MergeOutcome {
    let docs = DocBlockIndex::new(lines);
    let group = records.group().to_string();
    let mut outcome = MergeOutcome::default();
    let mut order: i64 = 0;

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if is_comment(line) || is_blank(line) {
            continue;
        }
        let location = SourceLocation::new(source, Some(idx + 1));

        let Some(assignment) = parse_assignment(line) else {
            debug!("Skipping non-assignment line {} of {}", idx + 1, source);
            diagnostics.push(
                Diagnostic::info(format!("skipped line without assignment: '{}'", line.trim()))
                    .with_group(&group)
                    .with_location(location),
            );
            continue;
        };

        let classification = classify_literal(assignment.literal);
        if classification.fallback {
            warn!(
                "Couldn't determine dtype of '{}' for {}; keeping it as a string literal",
                assignment.literal, assignment.name
            );
            diagnostics.push(
                Diagnostic::warning(format!(
                    "could not infer type of '{}' for {}, kept as str",
                    assignment.literal, assignment.name
                ))
                .with_group(&group)
                .with_location(location.clone()),
            );
        }

        let headers = preceding_headers(lines, idx);
        if !headers.is_empty()
            && !headers
                .iter()
                .any(|header| header.eq_ignore_ascii_case(assignment.name))
        {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "{} does not match documentation header(s) {}",
                    assignment.name,
                    headers.join(", ")
                ))
                .with_group(&group)
                .with_location(location.clone()),
            );
        }

        let doc = docs.lookup(assignment.name);
        let lower_name = assignment.name.to_lowercase();

        match records.position(&lower_name) {
            Some(pos) => {
                if let Some(record) = records.get_mut(pos) {
                    if record.name() != assignment.name {
                        diagnostics.push(
                            Diagnostic::warning(format!(
                                "{} is declared as {}",
                                assignment.name,
                                record.name()
                            ))
                            .with_group(&group)
                            .with_location(location),
                        );
                    }
                    record.default = classification.value;
                    record.order = order;
                    record.doc = doc;
                    outcome.updated += 1;
                }
            }
            None => {
                debug!("{} has a default but no declaration in {}", assignment.name, group);
                records.push(ParameterRecord::new(
                    assignment.name,
                    classification.value,
                    assignment.index_dim,
                    order,
                    group.as_str(),
                    doc,
                ));
                outcome.appended += 1;
            }
        }

        outcome.defaults_seen += 1;
        order += 1;
    }

    outcome
}
