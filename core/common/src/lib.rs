//! Common utilities and types shared across DriveGate crates.
//!
//! This module provides the error type and the identifiers that flow
//! between the storage client and the HTTP gateway.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{FileId, FileLookup, FolderId};
