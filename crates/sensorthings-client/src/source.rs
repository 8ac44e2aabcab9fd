//! Declarative document sources.
//!
//! A source is reloaded on every reconciliation pass, so a file edited
//! between passes is picked up as it stands.

use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use crate::error::{StaClientError, StaClientResult};

#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// A YAML file on disk.
    File(PathBuf),
    /// An already-parsed document tree.
    Inline { name: String, document: Value },
}

impl DocumentSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DocumentSource::File(path.into())
    }

    pub fn inline(name: impl Into<String>, document: Value) -> Self {
        DocumentSource::Inline {
            name: name.into(),
            document,
        }
    }

    /// Name used in logs and reports.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            DocumentSource::File(path) => path.display().to_string(),
            DocumentSource::Inline { name, .. } => name.clone(),
        }
    }

    /// Load the document tree.
    pub fn load(&self) -> StaClientResult<Value> {
        match self {
            DocumentSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    StaClientError::Io(format!("Failed to read file {}: {e}", path.display()))
                })?;
                parse_document(&text)
            }
            DocumentSource::Inline { document, .. } => Ok(document.clone()),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Parse YAML text into a generic, order-preserving tree.
pub fn parse_document(text: &str) -> StaClientResult<Value> {
    serde_yaml::from_str(text).map_err(Into::into)
}
