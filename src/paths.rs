//! Maps logical database names to files under the configured root.

use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

/// Resolves `<root>/<name>.<ext>` for a database name.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    extension: String,
}

impl PathResolver {
    /// Creates a resolver for the configured root, creating the directory if needed.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.root_dir)?;
        Ok(Self {
            root: config.root_dir.clone(),
            extension: config.extension.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file backing `name`. Names are used verbatim.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, self.extension))
    }

    /// Rejects names that would escape the root or address a hidden file.
    ///
    /// A name is a single path component, so separators are refused; a
    /// leading `.` covers `.`, `..` and hidden files.
    pub fn check_name(name: &str) -> Result<()> {
        let unsafe_name = name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\', '\0']);
        if unsafe_name {
            return Err(StoreError::invalid(format!(
                "Invalid database name '{}'",
                name
            )));
        }
        Ok(())
    }
}
