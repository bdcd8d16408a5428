//! Catalog builder: declarations plus defaults for every configured group.
//!
//! Groups are independent, so they are built in parallel and concatenated in
//! configuration order afterwards.

use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use super::group::GroupRecords;
use super::layout::InstallLayout;
use super::record::ParameterRecord;
use crate::config::{CatalogConfig, GroupConfig};
use crate::core::{read_source_lines, split_lines, Diagnostic, DiagnosticCollector, SourceLocation};
use crate::defaults::{merge_defaults, MergeOutcome};
use crate::parser::parse_declarations;

/// Physical lines of one source, labelled for diagnostics
#[derive(Debug, Clone)]
pub struct SourceText {
    pub label: String,
    pub lines: Vec<String>,
}

impl SourceText {
    pub fn new(label: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            label: label.into(),
            lines,
        }
    }

    pub fn from_text(label: impl Into<String>, text: &str) -> Self {
        Self::new(label, split_lines(text))
    }
}

/// Everything needed to build one group without touching the filesystem
#[derive(Debug, Clone)]
pub struct GroupSources {
    pub group: String,
    pub definitions: Vec<SourceText>,
    pub defaults: Option<SourceText>,
}

/// Records and findings of one group
#[derive(Debug, Clone)]
pub struct GroupBuild {
    pub group: String,
    pub records: Vec<ParameterRecord>,
    pub declared: usize,
    pub merge: MergeOutcome,
    pub diagnostics: DiagnosticCollector,
}

/// Per-group counts for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub records: usize,
    pub declared: usize,
    pub defaults_seen: usize,
    pub appended: usize,
}

impl From<&GroupBuild> for GroupSummary {
    fn from(build: &GroupBuild) -> Self {
        Self {
            group: build.group.clone(),
            records: build.records.len(),
            declared: build.declared,
            defaults_seen: build.merge.defaults_seen,
            appended: build.merge.appended,
        }
    }
}

/// Result of a whole catalog build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub records: Vec<ParameterRecord>,
    pub groups: Vec<GroupSummary>,
    pub diagnostics: DiagnosticCollector,
    pub version: Option<u32>,
}

impl BuildReport {
    fn from_groups(builds: Vec<GroupBuild>) -> Self {
        let mut report = BuildReport::default();
        for build in builds {
            report.groups.push(GroupSummary::from(&build));
            report.records.extend(build.records);
            report.diagnostics.merge(build.diagnostics);
        }
        report
    }
}

/// Builds one group from in-memory sources.
///
/// A definitions file with a dangling continuation is reported and
/// contributes no records; the rest of the group is still built.
pub fn build_group_from_sources(sources: &GroupSources) -> GroupBuild {
    let mut diagnostics = DiagnosticCollector::new();
    let mut records = GroupRecords::new(sources.group.as_str());

    for definitions in &sources.definitions {
        match parse_declarations(
            &definitions.lines,
            &sources.group,
            &definitions.label,
            &mut diagnostics,
        ) {
            Ok(declared) => records.extend(declared),
            Err(e) => {
                warn!("Skipping rest of {}: {}", definitions.label, e);
                diagnostics.push(
                    Diagnostic::error(e.to_string())
                        .with_group(&sources.group)
                        .with_location(SourceLocation::new(&definitions.label, None)),
                );
            }
        }
    }
    let declared = records.len();

    let merge = match &sources.defaults {
        Some(defaults) => merge_defaults(&defaults.lines, &mut records, &defaults.label, &mut diagnostics),
        None => MergeOutcome::default(),
    };

    GroupBuild {
        group: sources.group.clone(),
        records: records.into_records(),
        declared,
        merge,
        diagnostics,
    }
}

/// Builds every group in parallel, keeping the given group order
pub fn build_catalog(sources: &[GroupSources]) -> BuildReport {
    let builds: Vec<GroupBuild> = sources.par_iter().map(build_group_from_sources).collect();
    BuildReport::from_groups(builds)
}

/// Builds the catalog of an installation on disk
pub struct CatalogBuilder {
    layout: InstallLayout,
    config: CatalogConfig,
}

impl CatalogBuilder {
    pub fn new(layout: InstallLayout, config: CatalogConfig) -> Self {
        Self { layout, config }
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn build(&self) -> BuildReport {
        self.build_with_progress(&|_: &GroupBuild| {})
    }

    /// Same as [`build`](Self::build), calling `on_group` as each group finishes
    pub fn build_with_progress(&self, on_group: &(dyn Fn(&GroupBuild) + Sync)) -> BuildReport {
        let start = Instant::now();
        info!(
            "Building catalog of {} ({} groups)",
            self.layout.root.display(),
            self.config.groups.len()
        );

        let builds: Vec<GroupBuild> = self
            .config
            .groups
            .par_iter()
            .map(|group| {
                let (sources, missing) = self.load_group_sources(group);
                let mut build = build_group_from_sources(&sources);
                build.diagnostics.merge(missing);
                on_group(&build);
                build
            })
            .collect();

        let mut report = BuildReport::from_groups(builds);
        report.version = Some(self.layout.version);
        info!(
            "Catalog built: {} records, {} warnings, {} errors (in {:?})",
            report.records.len(),
            report.diagnostics.warning_count(),
            report.diagnostics.error_count(),
            start.elapsed()
        );
        report
    }

    /// Reads the files of a group; unreadable ones become diagnostics
    pub fn load_group_sources(&self, group: &GroupConfig) -> (GroupSources, DiagnosticCollector) {
        let mut diagnostics = DiagnosticCollector::new();
        let mut read = |template: &str| -> Option<SourceText> {
            let path = self.layout.resolve(template);
            let label = display_label(&self.layout.root, &path);
            match read_source_lines(&path) {
                Ok(lines) => Some(SourceText::new(label, lines)),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    diagnostics.push(
                        Diagnostic::warning(format!("source file skipped: {}", e))
                            .with_group(&group.name)
                            .with_location(SourceLocation::new(label, None)),
                    );
                    None
                }
            }
        };

        let definitions = group.definitions.iter().filter_map(|t| read(t)).collect();
        let defaults = group.defaults.as_deref().and_then(|t| read(t));

        let sources = GroupSources {
            group: group.name.clone(),
            definitions,
            defaults,
        };
        (sources, diagnostics)
    }
}

fn display_label(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::{Dtype, ParamValue};
    use pretty_assertions::assert_eq;

    fn controls() -> GroupSources {
        GroupSources {
            group: "controls".to_string(),
            definitions: vec![SourceText::from_text(
                "star_controls.inc",
                "real(dp) :: mixing_length_alpha\nlogical :: use_Ledoux_criterion, &\n   do_element_diffusion\n",
            )],
            defaults: Some(SourceText::from_text(
                "controls.defaults",
                "! ### mixing_length_alpha\nmixing_length_alpha = 2.0\n\ndo_element_diffusion = .true.\n",
            )),
        }
    }

    #[test]
    fn test_group_from_sources() {
        let build = build_group_from_sources(&controls());
        assert_eq!(build.declared, 3);
        assert_eq!(build.merge.updated, 2);

        let names: Vec<_> = build.records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["mixing_length_alpha", "use_Ledoux_criterion", "do_element_diffusion"]);

        let ledoux = &build.records[1];
        assert_eq!(ledoux.default, ParamValue::Bool(false));
        assert_eq!(ledoux.order, -1);
        assert_eq!(build.records[2].order, 1);
    }

    #[test]
    fn test_broken_definitions_file_is_reported() {
        let mut sources = controls();
        sources
            .definitions
            .push(SourceText::from_text("ctrls_io.f90", "integer :: dangling, &"));
        let build = build_group_from_sources(&sources);

        assert_eq!(build.declared, 3);
        assert_eq!(build.diagnostics.error_count(), 1);
    }

    #[test]
    fn test_catalog_keeps_group_order() {
        let star_job = GroupSources {
            group: "star_job".to_string(),
            definitions: vec![SourceText::from_text("star_job_controls.inc", "integer :: steps\n")],
            defaults: None,
        };
        let report = build_catalog(&[star_job, controls()]);

        assert_eq!(report.records.len(), 4);
        assert_eq!(report.records[0].group, "star_job");
        assert_eq!(report.records[0].dtype(), Dtype::Int);
        let groups: Vec<_> = report.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["star_job", "controls"]);
    }
}
