//! Installation layout: root discovery, version marker and source paths.

use std::path::{Path, PathBuf};

use crate::config::CatalogConfig;
use crate::core::{CatalogError, CatalogResult};

/// Environment variable naming the installation root
pub const ROOT_ENV_VAR: &str = "MESA_DIR";

/// Fortran source extension used by an installation of `version`
pub fn source_extension(version: u32, threshold: u32) -> &'static str {
    if version >= threshold {
        "f90"
    } else {
        "f"
    }
}

/// Explicit root, else `$MESA_DIR`; it must be an existing directory
pub fn discover_root(explicit: Option<&Path>) -> CatalogResult<PathBuf> {
    let root = match explicit {
        Some(path) => path.to_path_buf(),
        None => std::env::var_os(ROOT_ENV_VAR).map(PathBuf::from).ok_or_else(|| {
            CatalogError::ConfigDirectoryNotFound(format!(
                "no root given and the {} environment variable is not set",
                ROOT_ENV_VAR
            ))
        })?,
    };

    if !root.is_dir() {
        return Err(CatalogError::ConfigDirectoryNotFound(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    Ok(root)
}

/// Reads the single integer of a version marker file
pub fn read_version(path: &Path) -> CatalogResult<u32> {
    let content = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    let first = content.lines().next().unwrap_or("").trim();
    first.parse::<u32>().map_err(|e| CatalogError::InvalidVersion {
        path: path.to_path_buf(),
        reason: format!("'{}': {}", first, e),
    })
}

/// A located installation with its version resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub root: PathBuf,
    pub version: u32,
    pub extension: &'static str,
}

impl InstallLayout {
    pub fn open(root: impl Into<PathBuf>, config: &CatalogConfig) -> CatalogResult<Self> {
        let root = root.into();
        let version = read_version(&root.join(&config.version_file))?;
        let extension = source_extension(version, config.version_threshold);
        tracing::info!("Installation {} version {} ({} sources)", root.display(), version, extension);
        Ok(Self {
            root,
            version,
            extension,
        })
    }

    /// Discovers the root, then opens it
    pub fn discover(explicit: Option<&Path>, config: &CatalogConfig) -> CatalogResult<Self> {
        Self::open(discover_root(explicit)?, config)
    }

    /// Expands `{ext}` and joins the template onto the root
    pub fn resolve(&self, template: &str) -> PathBuf {
        self.root.join(template.replace("{ext}", self.extension))
    }

    pub fn catalog_dir(&self, config: &CatalogConfig) -> PathBuf {
        self.resolve(&config.catalog_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_threshold() {
        assert_eq!(source_extension(7379, 7380), "f");
        assert_eq!(source_extension(7380, 7380), "f90");
        assert_eq!(source_extension(15140, 7380), "f90");
    }

    #[test]
    fn test_open_resolves_templates() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/version_number"), "7184\n").unwrap();

        let layout = InstallLayout::open(dir.path(), &CatalogConfig::default()).unwrap();
        assert_eq!(layout.version, 7184);
        assert_eq!(
            layout.resolve("star/private/ctrls_io.{ext}"),
            dir.path().join("star/private/ctrls_io.f")
        );
    }

    #[test]
    fn test_bad_version_marker() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("version_number");
        std::fs::write(&marker, "r23.05.1\n").unwrap();
        assert!(matches!(
            read_version(&marker),
            Err(CatalogError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_missing_root() {
        let result = discover_root(Some(Path::new("/definitely/not/here")));
        assert!(matches!(result, Err(CatalogError::ConfigDirectoryNotFound(_))));
    }
}
