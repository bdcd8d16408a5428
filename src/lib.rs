/*!
# Inlist Catalog

Catalog of the configuration parameters of a Fortran code driven by namelist
files (MESA's `star_job`, `controls` and `pgstar` out of the box). For every
parameter the catalog records its declared type and rank, its default value,
its position in the defaults file and the documentation block that precedes
it there.

## Pipeline

```text
Installation root ($MESA_DIR)
├── data/version_number        -> source extension (.f / .f90)
├── definitions (*.inc, *.f90) -> parser: logical lines, `type :: names`
├── defaults (*.defaults)      -> defaults: literal typing, order, doc blocks
└── data/inlist_catalog/       <- catalog store: records.jsonl + manifest.json
```

Groups are independent and built in parallel; their records are
concatenated in configuration order.

## Usage

### CLI
```bash
# Build the catalog of the installation in $MESA_DIR
inlist-catalog build

# Look things up
inlist-catalog show mixing_length_alpha
inlist-catalog doc initial_mass --group star_job
inlist-catalog search overshoot --group controls
inlist-catalog query "dtype = ? AND group = ?" bool pgstar

# Write a group's defaults as an inlist
inlist-catalog render controls --with-docs --output inlist_defaults
```

### Library
```rust,no_run
use inlist_catalog::{build_and_save, open_catalog, CatalogConfig};

let config = CatalogConfig::default();
let report = build_and_save(None, &config)?;
println!("{} parameters", report.records.len());

let store = open_catalog("/opt/mesa/data/inlist_catalog");
let alpha = store.find("mixing_length_alpha", None)?;
println!("{} = {}", alpha.name(), alpha.default.to_fortran());
# Ok::<(), anyhow::Error>(())
```
*/

pub mod catalog;
pub mod cli_common;
pub mod config;
pub mod core;
pub mod defaults;
pub mod parser;

// Re-export main types for convenience
pub use catalog::{
    build_catalog, BuildReport, Catalog, CatalogBuilder, CatalogStore, Dtype, GroupSources, InstallLayout,
    ParamValue, ParameterRecord, SourceText,
};
pub use config::{CatalogConfig, GroupConfig};
pub use core::{CatalogError, CatalogResult, Diagnostic, DiagnosticCollector, ErrorLevel};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Builds the catalog of an installation and writes it to the configured directory
pub fn build_and_save(root: Option<&Path>, config: &CatalogConfig) -> Result<BuildReport> {
    let layout = InstallLayout::discover(root, config)?;
    let catalog_dir = layout.catalog_dir(config);

    let report = CatalogBuilder::new(layout, config.clone()).build();
    CatalogStore::create(&catalog_dir, &report.records, report.version)
        .with_context(|| format!("Failed to write catalog to {}", catalog_dir.display()))?;

    Ok(report)
}

/// Opens a catalog directory; nothing is read until the first query
pub fn open_catalog<P: Into<PathBuf>>(dir: P) -> CatalogStore {
    CatalogStore::new(dir)
}
