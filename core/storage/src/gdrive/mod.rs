//! Google Drive storage backend for DriveGate.
//!
//! This module provides the remote store used in production:
//! - Service-account authentication with a shared, expiry-driven token cache
//! - Multipart uploads, paginated listing and streamed downloads
//! - Full RemoteStore trait implementation

pub mod auth;
pub mod client;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use drivegate_common::{Error, Result};

pub use auth::{CachedToken, ServiceAccountKey, TokenManager, TokenSettings};
pub use client::DriveClient;

/// Google Drive backend configuration.
#[derive(Debug, Clone)]
pub struct GDriveConfig {
    /// Path to the service-account JSON key.
    pub credentials_path: PathBuf,
    /// OAuth2 scope requested for access tokens.
    pub scope: String,
    /// OAuth2 token endpoint.
    pub token_url: String,
    /// Drive metadata API base URL.
    pub api_base: String,
    /// Drive upload API base URL.
    pub upload_base: String,
    /// Connect timeout for outbound calls.
    pub connect_timeout: Duration,
}

impl Default for GDriveConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from(".info_source.json"),
            scope: auth::DRIVE_SCOPE.to_string(),
            token_url: auth::GOOGLE_TOKEN_URL.to_string(),
            api_base: client::DRIVE_API_BASE.to_string(),
            upload_base: client::DRIVE_UPLOAD_BASE.to_string(),
            connect_timeout: Duration::from_secs(60),
        }
    }
}

/// Build the shared HTTP client used for token exchange and API calls.
pub fn build_http_client(connect_timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(concat!("DriveGate/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))
}

/// Create a Drive-backed store from configuration.
///
/// Nothing is read from disk or fetched here; the credential file is read
/// when the first request needs a token.
///
/// # Errors
/// - Invalid token endpoint or API base URLs
/// - HTTP client construction failure
pub fn create_gdrive_store(config: &GDriveConfig) -> Result<Arc<DriveClient>> {
    let http = build_http_client(config.connect_timeout)?;

    let settings = TokenSettings::new(config.credentials_path.clone())?
        .with_scope(config.scope.clone())
        .with_token_url(&config.token_url)?;

    let token_manager = Arc::new(TokenManager::new(http.clone(), settings));
    let client = DriveClient::new(http, token_manager)
        .with_endpoints(&config.api_base, &config.upload_base)?;

    Ok(Arc::new(client))
}
