/*!
# Parameter Catalog

Records, per-group arenas, the builder that fills them from an installation,
the JSONL store and the query layer on top of it.
*/

pub mod builder;
pub mod group;
pub mod inlist;
pub mod layout;
pub mod query;
pub mod record;
pub mod store;

pub use builder::{build_catalog, build_group_from_sources, BuildReport, CatalogBuilder, GroupBuild, GroupSources, GroupSummary, SourceText};
pub use group::GroupRecords;
pub use inlist::{render_inlist, RenderOptions};
pub use layout::{discover_root, read_version, source_extension, InstallLayout, ROOT_ENV_VAR};
pub use query::{Catalog, Query};
pub use record::{CatalogRow, Dtype, ParamValue, ParameterRecord, RecordDict, RowTuple, UNORDERED};
pub use store::{backup_dir, CatalogManifest, CatalogStore};
