//! On-disk catalog: `records.jsonl` (one row tuple per line) and `manifest.json`.
//!
//! Writing a new catalog moves the previous one aside to `<dir>_old`. Reads
//! load the rows lazily on first use.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::query::Catalog;
use super::record::{CatalogRow, ParameterRecord, RowTuple};
use crate::core::{CatalogError, CatalogResult};

pub const RECORDS_FILE: &str = "records.jsonl";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub tool_version: String,
    pub installation_version: Option<u32>,
    pub created_at: String,
    pub records_count: usize,
    pub groups: Vec<String>,
}

/// Sibling directory holding the previous catalog
pub fn backup_dir(dir: &Path) -> PathBuf {
    let mut name = dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push("_old");
    dir.with_file_name(name)
}

pub struct CatalogStore {
    dir: PathBuf,
    catalog: OnceCell<Catalog>,
}

impl CatalogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            catalog: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.join(RECORDS_FILE).is_file()
    }

    /// Writes `records` as a fresh catalog, backing up any existing one
    pub fn create(
        dir: impl Into<PathBuf>,
        records: &[ParameterRecord],
        installation_version: Option<u32>,
    ) -> CatalogResult<Self> {
        let store = Self::new(dir);
        store.backup_existing()?;
        fs::create_dir_all(&store.dir).map_err(|e| CatalogError::io(&store.dir, e))?;

        let records_path = store.dir.join(RECORDS_FILE);
        let file = fs::File::create(&records_path).map_err(|e| CatalogError::io(&records_path, e))?;
        let mut writer = BufWriter::new(file);
        for record in records {
            let tuple: RowTuple = record.to_row().into();
            serde_json::to_writer(&mut writer, &tuple)?;
            writeln!(writer).map_err(|e| CatalogError::io(&records_path, e))?;
        }
        writer.flush().map_err(|e| CatalogError::io(&records_path, e))?;

        let mut groups: Vec<String> = Vec::new();
        for record in records {
            if !groups.contains(&record.group) {
                groups.push(record.group.clone());
            }
        }
        let manifest = CatalogManifest {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            installation_version,
            created_at: chrono::Utc::now().to_rfc3339(),
            records_count: records.len(),
            groups,
        };
        let manifest_path = store.dir.join(MANIFEST_FILE);
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
            .map_err(|e| CatalogError::io(&manifest_path, e))?;

        info!("Saved {} records to {}", records.len(), store.dir.display());
        Ok(store)
    }

    fn backup_existing(&self) -> CatalogResult<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        let backup = backup_dir(&self.dir);
        if backup.exists() {
            fs::remove_dir_all(&backup).map_err(|e| CatalogError::io(&backup, e))?;
        }
        fs::rename(&self.dir, &backup).map_err(|e| CatalogError::io(&self.dir, e))?;
        debug!("Moved previous catalog to {}", backup.display());
        Ok(())
    }

    pub fn manifest(&self) -> CatalogResult<CatalogManifest> {
        let path = self.dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(CatalogError::NoCatalog {
                path: self.dir.clone(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| CatalogError::io(&path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The loaded catalog; rows are read on the first call only
    pub fn catalog(&self) -> CatalogResult<&Catalog> {
        self.catalog.get_or_try_init(|| self.load())
    }

    fn load(&self) -> CatalogResult<Catalog> {
        if !self.exists() {
            return Err(CatalogError::NoCatalog {
                path: self.dir.clone(),
            });
        }
        let path = self.dir.join(RECORDS_FILE);
        let file = fs::File::open(&path).map_err(|e| CatalogError::io(&path, e))?;

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| CatalogError::io(&path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let tuple: RowTuple = serde_json::from_str(&line)?;
            records.push(ParameterRecord::from_row(CatalogRow::from(tuple))?);
        }
        debug!("Loaded {} records from {}", records.len(), path.display());
        Ok(Catalog::new(records))
    }

    pub fn find(&self, name: &str, group: Option<&str>) -> CatalogResult<&ParameterRecord> {
        self.catalog()?.find(name, group)
    }

    pub fn search<S: AsRef<str>>(&self, template: &str, terms: &[S]) -> CatalogResult<Vec<&ParameterRecord>> {
        self.catalog()?.search(template, terms)
    }

    pub fn search_name(&self, fragment: &str, group: Option<&str>) -> CatalogResult<Vec<&ParameterRecord>> {
        self.catalog()?.search_name(fragment, group)
    }

    pub fn search_doc(&self, fragment: &str, group: Option<&str>) -> CatalogResult<Vec<&ParameterRecord>> {
        self.catalog()?.search_doc(fragment, group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::ParamValue;
    use tempfile::TempDir;

    fn records() -> Vec<ParameterRecord> {
        vec![
            ParameterRecord::new("mixing_length_alpha", ParamValue::Float(2.0), 0, 0, "controls", "! ### mixing_length_alpha"),
            ParameterRecord::new("job_name", ParamValue::Str("'run'".into()), 0, 0, "star_job", "doc"),
        ]
    }

    #[test]
    fn test_backup_dir_name() {
        assert_eq!(
            backup_dir(Path::new("/x/data/inlist_catalog")),
            PathBuf::from("/x/data/inlist_catalog_old")
        );
    }

    #[test]
    fn test_create_and_reload() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("catalog");
        CatalogStore::create(&dir, &records(), Some(15140)).unwrap();

        let store = CatalogStore::new(&dir);
        let manifest = store.manifest().unwrap();
        assert_eq!(manifest.records_count, 2);
        assert_eq!(manifest.groups, vec!["controls", "star_job"]);
        assert_eq!(store.catalog().unwrap().records(), records().as_slice());
    }

    #[test]
    fn test_rebuild_keeps_backup() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("catalog");
        CatalogStore::create(&dir, &records(), None).unwrap();
        CatalogStore::create(&dir, &records()[..1], None).unwrap();

        let old = CatalogStore::new(backup_dir(&dir));
        assert_eq!(old.catalog().unwrap().len(), 2);
        assert_eq!(CatalogStore::new(&dir).catalog().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_catalog() {
        let tmp = TempDir::new().unwrap();
        let store = CatalogStore::new(tmp.path().join("absent"));
        assert!(matches!(store.catalog(), Err(CatalogError::NoCatalog { .. })));
        assert!(matches!(store.find("x", None), Err(CatalogError::NoCatalog { .. })));
    }
}
