//! Gateway configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use drivegate_common::{Error, Result};
use drivegate_storage::gdrive::{auth, client, GDriveConfig};

/// Where upload looks for a same-named file to replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplaceScope {
    /// Only files inside the target folder.
    #[default]
    Folder,
    /// Every file the service account can see.
    Global,
}

impl FromStr for ReplaceScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "folder" => Ok(ReplaceScope::Folder),
            "global" => Ok(ReplaceScope::Global),
            other => Err(format!(
                "unknown replace scope '{}', expected 'folder' or 'global'",
                other
            )),
        }
    }
}

impl fmt::Display for ReplaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplaceScope::Folder => f.write_str("folder"),
            ReplaceScope::Global => f.write_str("global"),
        }
    }
}

/// Gateway configuration.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Path to the service-account JSON key.
    pub credentials_path: PathBuf,
    /// OAuth2 token endpoint.
    pub token_url: String,
    /// OAuth2 scope requested for access tokens.
    pub scope: String,
    /// Drive metadata API base URL.
    pub api_base: String,
    /// Drive upload API base URL.
    pub upload_base: String,
    /// Search scope for the replace step of an upload.
    pub replace_scope: ReplaceScope,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    /// Connect timeout for calls to the remote store, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8082)),
            credentials_path: PathBuf::from(".info_source.json"),
            token_url: auth::GOOGLE_TOKEN_URL.to_string(),
            scope: auth::DRIVE_SCOPE.to_string(),
            api_base: client::DRIVE_API_BASE.to_string(),
            upload_base: client::DRIVE_UPLOAD_BASE.to_string(),
            replace_scope: ReplaceScope::default(),
            max_upload_bytes: 100 * 1024 * 1024,
            request_timeout_secs: 60,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// - File cannot be read
    /// - File is not a valid configuration object
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path).await?;
        serde_json::from_slice(&raw).map_err(|e| {
            Error::Serialization(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Check values that cannot be expressed in the type.
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(Error::InvalidInput(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the Drive backend.
    pub fn drive_config(&self) -> GDriveConfig {
        GDriveConfig {
            credentials_path: self.credentials_path.clone(),
            scope: self.scope.clone(),
            token_url: self.token_url.clone(),
            api_base: self.api_base.clone(),
            upload_base: self.upload_base.clone(),
            connect_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
