//! Router construction and the server loop.

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use drivegate_common::Result;
use drivegate_storage::{create_gdrive_store, RemoteStore};

use crate::config::{GatewayConfig, ReplaceScope};
use crate::error::ApiError;
use crate::handlers::{delete_file, download_file, file_metadata, healthz, list_files, upload_file};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Authenticated remote store, shared across requests.
    pub store: Arc<dyn RemoteStore>,
    pub replace_scope: ReplaceScope,
}

/// Bind every endpoint to its handler.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/upload/file", post(upload_file))
        .route("/list", get(list_files))
        .route("/download/{file_id}", get(download_file))
        .route("/file/metadata", post(file_metadata))
        .route("/file/delete/{file_id}", delete(delete_file))
        .fallback(|| async { ApiError::not_found("Not found") })
        .method_not_allowed_fallback(|| async {
            ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        })
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Serve the gateway until `shutdown` resolves.
///
/// The Drive store is built once and shared; its access token is minted
/// on the first request that needs one.
///
/// # Errors
/// - Invalid configuration
/// - Listen address cannot be bound
pub async fn run<F>(config: &GatewayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;

    let store = create_gdrive_store(&config.drive_config())?;
    let backend = store.name().to_string();
    let state = AppState {
        store,
        replace_scope: config.replace_scope,
    };

    let app = build_router(state, config.max_upload_bytes).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!(
        addr = %config.listen_addr,
        store = %backend,
        credentials = %config.credentials_path.display(),
        replace_scope = %config.replace_scope,
        "drivegate listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("drivegate stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{app, send};
    use axum::{body::Body, http::Request};
    use drivegate_storage::MemoryStore;

    #[tokio::test]
    async fn test_healthz() {
        let store = Arc::new(MemoryStore::new());
        let request = Request::get("/healthz").body(Body::empty()).unwrap();

        let (status, json) = send(app(store.clone()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let request = Request::get("/nope").body(Body::empty()).unwrap();

        let (status, json) = send(app(store), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn test_wrong_method_gets_json_error() {
        let store = Arc::new(MemoryStore::new());
        let request = Request::get("/file/delete/abc").body(Body::empty()).unwrap();

        let (status, json) = send(app(store.clone()), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["error"], "Method not allowed");
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_config() {
        let config = GatewayConfig {
            max_upload_bytes: 0,
            ..GatewayConfig::default()
        };
        assert!(run(&config, async {}).await.is_err());
    }
}
