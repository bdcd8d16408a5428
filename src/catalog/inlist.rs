//! Renders a namelist group back into inlist text with its default values.

use std::fmt::Write;

use super::record::ParameterRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit each parameter's documentation block above it
    pub with_docs: bool,
    /// Also emit parameters without a default, commented out
    pub include_unassigned: bool,
}

fn target(record: &ParameterRecord) -> String {
    if record.dim == 0 {
        record.name().to_string()
    } else {
        format!("{}({})", record.name(), vec![":"; record.dim].join(","))
    }
}

/// `&group`, one `name = value` per parameter in default order, then `/`
pub fn render_inlist(group: &str, records: &[&ParameterRecord], options: RenderOptions) -> String {
    let mut assigned: Vec<&ParameterRecord> = records.iter().copied().filter(|r| r.has_default()).collect();
    assigned.sort_by_key(|r| r.order);

    let mut out = String::new();
    let _ = writeln!(out, "&{}", group);

    for record in assigned {
        if options.with_docs && record.doc.starts_with('!') {
            out.push('\n');
            for line in record.doc.lines() {
                let _ = writeln!(out, "  {}", line.trim());
            }
        }
        let _ = writeln!(out, "  {} = {}", target(record), record.default.to_fortran());
    }

    if options.include_unassigned {
        let unassigned: Vec<_> = records.iter().filter(|r| !r.has_default()).collect();
        if !unassigned.is_empty() {
            let _ = writeln!(out, "\n  ! declared without a default");
            for record in unassigned {
                let _ = writeln!(out, "  ! {} = {}", target(record), record.default.to_fortran());
            }
        }
    }

    let _ = writeln!(out, "/ ! end of {} namelist", group);
    out
}
