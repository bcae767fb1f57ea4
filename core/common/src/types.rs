//! Common types used throughout DriveGate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a file in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Create a new FileId from a string.
    ///
    /// # Errors
    /// - Returns error if id is empty
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidInput(
                "File ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a folder in the remote store.
///
/// Folders are files in the remote store too; the separate type keeps
/// handler signatures honest about which id is expected where.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    /// Create a new FolderId from a string.
    ///
    /// # Errors
    /// - Returns error if id is empty
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Folder ID is required".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a single file is looked up: by id or by exact name.
///
/// Built from the two optional identifiers a caller may send. A non-empty
/// id wins over a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLookup {
    ById(FileId),
    ByName(String),
}

impl FileLookup {
    /// Resolve the optional identifiers into a lookup.
    ///
    /// # Errors
    /// - Returns `InvalidInput` if neither identifier is non-empty
    pub fn from_parts(file_id: Option<String>, file_name: Option<String>) -> crate::Result<Self> {
        if let Some(id) = file_id.filter(|id| !id.is_empty()) {
            return Ok(FileLookup::ById(FileId(id)));
        }
        if let Some(name) = file_name.filter(|name| !name.is_empty()) {
            return Ok(FileLookup::ByName(name));
        }
        Err(crate::Error::InvalidInput(
            "File ID or File Name is required".to_string(),
        ))
    }
}
