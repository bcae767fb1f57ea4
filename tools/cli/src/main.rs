//! DriveGate CLI - run the Drive gateway or check its credentials.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use drivegate_gateway::{GatewayConfig, ReplaceScope};
use drivegate_storage::create_gdrive_store;

#[derive(Parser)]
#[command(name = "drivegate")]
#[command(about = "DriveGate - HTTP gateway for Google Drive file operations")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway.
    Serve(ConfigArgs),

    /// Mint an access token with the configured key and print its expiry.
    CheckAuth(ConfigArgs),
}

/// Overrides applied on top of the config file.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON config file.
    #[arg(short, long, env = "DRIVEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(short, long, env = "DRIVEGATE_LISTEN")]
    listen: Option<SocketAddr>,

    /// Service-account key file.
    #[arg(long, env = "DRIVEGATE_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Where uploads look for a file to replace: "folder" or "global".
    #[arg(long, env = "DRIVEGATE_REPLACE_SCOPE")]
    replace_scope: Option<ReplaceScope>,

    /// Largest accepted request body, in bytes.
    #[arg(long, env = "DRIVEGATE_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    /// OAuth2 token endpoint.
    #[arg(long, env = "DRIVEGATE_TOKEN_URL")]
    token_url: Option<String>,

    /// OAuth2 scope requested for access tokens.
    #[arg(long, env = "DRIVEGATE_SCOPE")]
    scope: Option<String>,

    /// Drive metadata API base URL.
    #[arg(long, env = "DRIVEGATE_API_BASE")]
    api_base: Option<String>,

    /// Drive upload API base URL.
    #[arg(long, env = "DRIVEGATE_UPLOAD_BASE")]
    upload_base: Option<String>,

    /// Connect timeout for Drive calls, in seconds.
    #[arg(long, env = "DRIVEGATE_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,
}

impl ConfigArgs {
    async fn resolve(self) -> Result<GatewayConfig> {
        let mut config = match &self.config {
            Some(path) => GatewayConfig::load(path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => GatewayConfig::default(),
        };
        self.apply(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn apply(self, config: &mut GatewayConfig) {
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(credentials) = self.credentials {
            config.credentials_path = credentials;
        }
        if let Some(scope) = self.replace_scope {
            config.replace_scope = scope;
        }
        if let Some(max) = self.max_upload_bytes {
            config.max_upload_bytes = max;
        }
        if let Some(token_url) = self.token_url {
            config.token_url = token_url;
        }
        if let Some(scope) = self.scope {
            config.scope = scope;
        }
        if let Some(api_base) = self.api_base {
            config.api_base = api_base;
        }
        if let Some(upload_base) = self.upload_base {
            config.upload_base = upload_base;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve(args) => cmd_serve(args.resolve().await?).await,
        Commands::CheckAuth(args) => cmd_check_auth(args.resolve().await?).await,
    }
}

/// Run the gateway until Ctrl-C.
async fn cmd_serve(config: GatewayConfig) -> Result<()> {
    drivegate_gateway::run(&config, shutdown_signal())
        .await
        .context("Gateway stopped with an error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Exchange the service-account key for a token once.
async fn cmd_check_auth(config: GatewayConfig) -> Result<()> {
    info!(
        "Checking credentials at {}",
        config.credentials_path.display()
    );

    let store = create_gdrive_store(&config.drive_config()).context("Invalid Drive settings")?;
    let tokens = store.token_manager();
    tokens
        .get_access_token()
        .await
        .context("Token exchange failed")?;

    println!("Credentials OK");
    println!("  Key: {}", config.credentials_path.display());
    println!("  Token endpoint: {}", config.token_url);
    if let Some(expires_at) = tokens.expires_at().await {
        println!("  Token expires: {}", expires_at.to_rfc3339());
    }

    Ok(())
}
