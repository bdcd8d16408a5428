/*!
# Catalog Configuration

Describes where the namelist groups of an installation live. The built-in
defaults reproduce the MESA star layout; a TOML or YAML file can describe
other groups (binary, astero, ...) with the same shape.

Path templates are relative to the installation root and may use `{ext}`,
which expands to the Fortran source extension chosen by the version marker.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Versions at or above this use `.f90` sources, older ones `.f`
pub const DEFAULT_VERSION_THRESHOLD: u32 = 7380;

/// Files of one namelist group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Namelist name, e.g. `controls`
    pub name: String,

    /// Definitions sources, parsed in order
    #[serde(default)]
    pub definitions: Vec<String>,

    /// Defaults source giving values, order and documentation
    pub defaults: Option<String>,
}

impl GroupConfig {
    pub fn new(name: &str, definitions: &[&str], defaults: &str) -> Self {
        Self {
            name: name.to_string(),
            definitions: definitions.iter().map(|d| d.to_string()).collect(),
            defaults: Some(defaults.to_string()),
        }
    }
}

/// Top-level configuration of the catalog builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Version marker, relative to the installation root
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// First version whose sources use the `.f90` extension
    #[serde(default = "default_version_threshold")]
    pub version_threshold: u32,

    /// Catalog store directory, relative to the installation root
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: String,

    /// Namelist groups, processed and stored in this order
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupConfig>,
}

fn default_version_file() -> String {
    "data/version_number".to_string()
}

fn default_version_threshold() -> u32 {
    DEFAULT_VERSION_THRESHOLD
}

fn default_catalog_dir() -> String {
    "data/inlist_catalog".to_string()
}

fn default_groups() -> Vec<GroupConfig> {
    vec![
        GroupConfig::new(
            "star_job",
            &["star/private/star_job_controls.inc"],
            "star/defaults/star_job.defaults",
        ),
        GroupConfig::new(
            "controls",
            &["star/private/star_controls.inc", "star/private/ctrls_io.{ext}"],
            "star/defaults/controls.defaults",
        ),
        GroupConfig::new(
            "pgstar",
            &["star/private/pgstar_controls.inc"],
            "star/defaults/pgstar.defaults",
        ),
    ]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            version_file: default_version_file(),
            version_threshold: default_version_threshold(),
            catalog_dir: default_catalog_dir(),
            groups: default_groups(),
        }
    }
}

impl CatalogConfig {
    /// Loads a TOML or YAML config, chosen by file extension
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog config from {}", path.display()))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config from {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config from {}", path.display()))?,
        };

        for problem in config.validate() {
            tracing::warn!("{}: {}", path.display(), problem);
        }
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(&path, content).with_context(|| {
            format!("Failed to write catalog config to {}", path.as_ref().display())
        })?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize catalog config to TOML")
    }

    /// Explicit file, else the user config if present, else built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        if let Some(user) = user_config_path().filter(|p| p.exists()) {
            tracing::debug!("Using user config {}", user.display());
            return Self::load_from_file(user);
        }
        Ok(Self::default())
    }

    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Problems that make parts of the config useless; never fatal
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.groups.is_empty() {
            problems.push("no namelist groups configured".to_string());
        }
        let mut seen = HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.name.as_str()) {
                problems.push(format!("group '{}' is configured twice", group.name));
            }
            if group.definitions.is_empty() && group.defaults.is_none() {
                problems.push(format!("group '{}' has no source files", group.name));
            }
        }
        problems
    }
}

/// `~/.inlist_catalog/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".inlist_catalog").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        let names: Vec<_> = config.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["star_job", "controls", "pgstar"]);
        assert_eq!(config.version_threshold, 7380);
        assert!(config.group("controls").unwrap().definitions[1].contains("{ext}"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.toml");
        let config = CatalogConfig::default();
        config.save_to_file(&path).unwrap();

        let loaded = CatalogConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_yaml_with_defaults_filled_in() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(
            &path,
            "groups:\n  - name: binary_controls\n    definitions: [binary/private/binary_controls.inc]\n    defaults: binary/defaults/binary_controls.defaults\n",
        )
        .unwrap();

        let config = CatalogConfig::load_from_file(&path).unwrap();
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].name, "binary_controls");
        assert_eq!(config.version_file, "data/version_number");
    }

    #[test]
    fn test_validation_problems() {
        let config = CatalogConfig {
            groups: vec![
                GroupConfig::new("a", &["a.inc"], "a.defaults"),
                GroupConfig::new("a", &["b.inc"], "b.defaults"),
                GroupConfig {
                    name: "empty".to_string(),
                    definitions: Vec::new(),
                    defaults: None,
                },
            ],
            ..CatalogConfig::default()
        };
        assert_eq!(config.validate().len(), 2);
    }
}
