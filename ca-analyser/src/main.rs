//! ca-analyser - Contract Analysis service
//!
//! Accepts uploaded contracts, analyzes them with an LLM, stores structured
//! results, renders localized HTML reports and emails them to their owners.
//!
//! Subcommands `create-user` and `issue-token` bootstrap accounts without
//! going through the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ca_common::api::auth::issue_token;
use ca_common::config::{self, TomlConfig};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ca_analyser::services::blob_store::BlobStore;
use ca_analyser::services::email_client::ResendClient;
use ca_analyser::services::llm_client::OpenAiClient;
use ca_analyser::AppState;

/// Command-line arguments for ca-analyser
#[derive(Parser, Debug)]
#[command(name = "ca-analyser")]
#[command(about = "Contract analysis and report service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder holding the database and blobs
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Create a user account and print its id
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        admin: bool,
    },

    /// Issue an API token for an existing user
    IssueToken {
        #[arg(long)]
        user_id: uuid::Uuid,
        /// Token lifetime in days; omit for a non-expiring token
        #[arg(long)]
        days: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::resolve_config_path(args.config.as_deref());
    let mut toml_config = TomlConfig::load_or_default(config_path.as_deref());
    toml_config.apply_env_overrides();
    if let Some(port) = args.port {
        toml_config.server.port = port;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ca-analyser (Contract Analysis) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve root folder and open database
    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    std::fs::create_dir_all(&root_folder)
        .with_context(|| format!("Failed to create root folder {}", root_folder.display()))?;
    info!("Root folder: {}", root_folder.display());

    let db_path = config::database_path(&root_folder);
    let db_pool = ca_analyser::db::init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(db_pool, toml_config, root_folder).await,
        Command::CreateUser { email, name, admin } => {
            let user = ca_analyser::db::users::create_user(&db_pool, &email, name.as_deref(), admin)
                .await
                .context("Failed to create user")?;
            println!("{}", user.id);
            Ok(())
        }
        Command::IssueToken { user_id, days } => {
            let token = issue_token(&db_pool, user_id, days.map(chrono::Duration::days))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to issue token: {}", e))?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(db_pool: sqlx::SqlitePool, toml_config: TomlConfig, root_folder: PathBuf) -> Result<()> {
    let llm = OpenAiClient::new(&toml_config.llm).context("Failed to build LLM client")?;
    if toml_config.llm.api_key.is_none() {
        warn!("No LLM API key configured - analysis requests will fail");
    }

    let email = ResendClient::new(&toml_config.email).context("Failed to build email client")?;
    if toml_config.email.api_key.is_none() {
        warn!("No email API key configured - report emails will fail");
    }

    let signing_secret = match toml_config.pipeline.signing_secret.clone() {
        Some(secret) => secret,
        None => {
            warn!("No signing secret configured - signed links will not survive a restart");
            ca_common::api::auth::generate_token()
        }
    };
    let blobs = BlobStore::new(
        config::blob_root(&root_folder),
        &toml_config.pipeline.public_base_url,
        &signing_secret,
    )
    .context("Invalid signing secret")?;

    let addr: SocketAddr = format!("{}:{}", toml_config.server.host, toml_config.server.port)
        .parse()
        .context("Invalid listen address")?;

    let state = AppState::new(db_pool, toml_config, Arc::new(llm), Arc::new(email), blobs);
    let app = ca_analyser::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
