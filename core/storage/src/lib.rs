//! Remote storage access for DriveGate.
//!
//! This module provides a trait-based interface over the remote file store
//! (Google Drive) and an in-memory implementation used by tests and local
//! development.
//!
//! # Design Principles
//! - One remote call per operation: no buffering, no retries
//! - Structured queries: user input never reaches the query language unescaped
//! - Streaming downloads: the response body owns the upstream connection
//! - Unified error semantics: upstream statuses map onto the common error type

pub mod gdrive;
pub mod memory;
pub mod provider;
pub mod query;

pub use gdrive::{create_gdrive_store, DriveClient, GDriveConfig, TokenManager};
pub use memory::{MemoryStore, StoreCall, StoreOp};
pub use provider::{
    ByteStream, DownloadStream, NewFile, RemoteFile, RemoteStore, DEFAULT_MIME_TYPE,
};
pub use query::DriveQuery;
