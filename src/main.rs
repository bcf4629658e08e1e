use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use invoice_dashboard::actions::InvoiceActions;
use invoice_dashboard::app::{router, AppState};
use invoice_dashboard::auth::{issue_session_token, SessionClaims};
use invoice_dashboard::cache::InMemoryRevalidator;
use invoice_dashboard::database::{DatabaseManager, PgInvoiceStore};
use invoice_dashboard::middleware::RouteGate;
use invoice_dashboard::{config, is_production};

/// Invoice dashboard action server
#[derive(Debug, Parser)]
#[command(name = "invoice-dashboard", version, about)]
struct Cli {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Print a session token for the given email, signed with AUTH_SECRET")]
    Token {
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up POSTGRES_URL, AUTH_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    if let Some(Commands::Token { email }) = cli.command {
        let claims = SessionClaims::new(uuid::Uuid::new_v4(), email);
        let token = issue_session_token(&claims, &config.security.session_secret)
            .context("failed to issue session token")?;
        println!("{}={}", config.security.session_cookie, token);
        return Ok(());
    }

    tracing::info!("Starting invoice dashboard in {:?} mode", config.environment);

    if is_production!() && config.security.session_secret.is_empty() {
        anyhow::bail!("AUTH_SECRET must be set in production");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the invoice database")?;

    let actions = InvoiceActions::new(
        Arc::new(PgInvoiceStore::new(pool.clone())),
        Arc::new(InMemoryRevalidator::new()),
        config.invoices.clone(),
    );
    let gate = RouteGate::from_config(&config.security).context("invalid route matcher")?;
    let app = router(AppState::new(actions), gate);

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Invoice dashboard listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(&pool).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
