//! Loaded model file

use std::path::{Path, PathBuf};

use crate::frontmatter::split_frontmatter;
use crate::locator::LocateError;

/// A model file split into its header and SQL body. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Resolved file path
    pub path: PathBuf,

    /// Original UTF-8 content
    pub raw_content: String,

    /// Frontmatter region (empty when the file has none)
    pub frontmatter: String,

    /// SQL body after the frontmatter
    pub body: String,
}

impl Model {
    /// Read a model file from disk
    pub fn load(path: &Path) -> Result<Self, LocateError> {
        let raw_content = std::fs::read_to_string(path).map_err(|e| LocateError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Self::from_content(path, raw_content))
    }

    /// Build a model from in-memory content
    pub fn from_content(path: impl Into<PathBuf>, raw_content: impl Into<String>) -> Self {
        let raw_content = raw_content.into();
        let (frontmatter, body) = split_frontmatter(&raw_content);
        let frontmatter = frontmatter.to_string();
        let body = body.to_string();

        Self {
            path: path.into(),
            raw_content,
            frontmatter,
            body,
        }
    }

    /// Model file name, for the report summary
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
