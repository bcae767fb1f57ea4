//! HTTP gateway exposing remote file operations as a small JSON API.
//!
//! Each endpoint validates its input, calls the shared [`RemoteStore`]
//! and shapes the result into JSON. Errors are turned into responses at
//! the handler boundary and never escape further.
//!
//! [`RemoteStore`]: drivegate_storage::RemoteStore

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

#[cfg(test)]
mod test_support;

pub use config::{GatewayConfig, ReplaceScope};
pub use error::ApiError;
pub use server::{build_router, run, AppState};
