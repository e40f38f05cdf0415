//! Collection loader
//!
//! Reads collection YAML files from a directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use super::data::CollectionData;

/// Environment variable overriding the collections directory.
pub const COLLECTIONS_DIR_ENV: &str = "SCRIPTFORGE_COLLECTIONS_DIR";

pub struct CollectionLoader {
    collections_dir: PathBuf,
}

impl CollectionLoader {
    pub fn new(collections_dir: impl Into<PathBuf>) -> Self {
        Self {
            collections_dir: collections_dir.into(),
        }
    }

    /// Create loader from SCRIPTFORGE_COLLECTIONS_DIR or a default location
    ///
    /// Path resolution order:
    /// 1. SCRIPTFORGE_COLLECTIONS_DIR environment variable
    /// 2. Relative "collections" path (running from the workspace root)
    /// 3. CARGO_MANIFEST_DIR/collections at runtime, then at compile time
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var(COLLECTIONS_DIR_ENV) {
            return Self::new(dir);
        }

        if Path::new("collections").is_dir() {
            return Self::new("collections");
        }

        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let candidate = Path::new(&manifest_dir).join("collections");
            if candidate.is_dir() {
                return Self::new(candidate);
            }
        }

        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/collections"))
    }

    pub fn collections_dir(&self) -> &Path {
        &self.collections_dir
    }

    /// Load `<dir>/<name>.yaml`.
    pub fn load(&self, name: &str) -> Result<CollectionData> {
        let path = self.collections_dir.join(format!("{}.yaml", name));
        self.load_file(&path)
    }

    pub fn load_file(&self, path: &Path) -> Result<CollectionData> {
        info!("Loading collection from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let collection: CollectionData = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        info!(
            "Loaded collection '{}' with {} categories and {} functions",
            collection.os,
            collection.actions.len(),
            collection.functions.len()
        );

        Ok(collection)
    }

    /// Names of all `*.yaml` collections in the directory, sorted.
    pub fn available(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.collections_dir).with_context(|| {
            format!("Failed to read directory {}", self.collections_dir.display())
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load every collection in the directory, keyed by file name.
    pub fn load_all(&self) -> Result<Vec<(String, CollectionData)>> {
        self.available()?
            .into_iter()
            .map(|name| {
                let collection = self.load(&name)?;
                Ok((name, collection))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_core::ScriptLanguage;

    const MINIMAL: &str = r#"
os: linux
scripting:
  language: shellscript
actions:
  - category: Cleanup
    children:
      - name: Clear tmp
        code: rm -rf /tmp/cache
"#;

    #[test]
    fn test_load_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("linux.yaml"), MINIMAL).unwrap();

        let loader = CollectionLoader::new(dir.path());
        let collection = loader.load("linux").unwrap();
        assert_eq!(collection.os, "linux");
        assert_eq!(collection.scripting.language, ScriptLanguage::Shellscript);
        assert!(collection.functions.is_empty());
    }

    #[test]
    fn test_load_all_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), MINIMAL).unwrap();
        std::fs::write(dir.path().join("a.yaml"), MINIMAL).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loader = CollectionLoader::new(dir.path());
        let names: Vec<_> = loader
            .load_all()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "os: [").unwrap();

        let err = CollectionLoader::new(dir.path()).load("broken").unwrap_err();
        assert!(format!("{}", err).starts_with("Failed to parse"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CollectionLoader::new(dir.path()).load("absent").unwrap_err();
        assert!(format!("{}", err).starts_with("Failed to read"));
    }
}
