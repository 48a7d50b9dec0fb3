//! Read-only view of the project's `package.json`.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Manifest file name at the project root.
pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("No package.json found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which dependency table a package lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencyKind {
    Production,
    Development,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "dependencies",
            Self::Development => "devDependencies",
        }
    }

    /// Flag passed to `npm install`.
    pub fn save_flag(&self) -> &'static str {
        match self {
            Self::Production => "--save",
            Self::Development => "--save-dev",
        }
    }
}

/// Declared dependencies of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
}

/// Path of the manifest inside `root`.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

impl Manifest {
    /// Load `<root>/package.json`.
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        let path = manifest_path(root);
        let content = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ManifestError::NotFound(root.to_path_buf())
            } else {
                ManifestError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        Self::parse(&content).map_err(|source| ManifestError::Parse { path, source })
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }

    /// Entries of one dependency table, ordered by name.
    pub fn entries(&self, kind: DependencyKind) -> &BTreeMap<String, String> {
        match kind {
            DependencyKind::Production => &self.dependencies,
            DependencyKind::Development => &self.dev_dependencies,
        }
    }

    /// Names declared in either table.
    pub fn installed(&self) -> BTreeSet<&str> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .map(String::as_str)
            .collect()
    }

    /// Declared version specifier and table of `name`. Production wins when a
    /// package is listed in both.
    pub fn version_of(&self, name: &str) -> Option<(&str, DependencyKind)> {
        self.dependencies
            .get(name)
            .map(|v| (v.as_str(), DependencyKind::Production))
            .or_else(|| {
                self.dev_dependencies
                    .get(name)
                    .map(|v| (v.as_str(), DependencyKind::Development))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_other_fields() {
        let manifest = Manifest::parse(
            r#"{"name":"app","scripts":{"test":"jest"},"dependencies":{"lodash":"^4.17.21"}}"#,
        )
        .unwrap();
        assert_eq!(manifest.dependencies.len(), 1);
        assert!(manifest.dev_dependencies.is_empty());
    }

    #[test]
    fn test_save_flags() {
        assert_eq!(DependencyKind::Production.save_flag(), "--save");
        assert_eq!(DependencyKind::Development.save_flag(), "--save-dev");
        assert_eq!(DependencyKind::Development.as_str(), "devDependencies");
    }
}
