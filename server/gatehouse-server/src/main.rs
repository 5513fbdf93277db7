use anyhow::{Context, Result};
use auth_gateway::{create_app, start_sweeper, GatewayConfig, GatewayState};
use auth_identity::{InMemorySessionRepository, InMemoryUserRepository, User, UserRepository};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Gatehouse authentication gateway
#[derive(Parser, Debug)]
#[command(name = "gatehouse-server")]
#[command(about = "Serves the v1 API behind a configurable authentication strategy")]
struct Args {
    /// Server bind address
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "API_PORT", default_value = "5000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Email of a user created at startup
    #[arg(long, env = "SEED_USER_EMAIL", requires = "seed_password")]
    seed_email: Option<String>,

    /// Password of the startup user
    #[arg(long, env = "SEED_USER_PASSWORD", hide_env_values = true)]
    seed_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    init_tracing(args.verbose, args.json_logs);
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let mut config = GatewayConfig::from_env().context("Invalid gateway configuration")?;
    config.host = args.host.clone();
    config.port = args.port;

    let users = Arc::new(InMemoryUserRepository::new());
    let sessions = Arc::new(InMemorySessionRepository::new());

    if let (Some(email), Some(password)) = (&args.seed_email, &args.seed_password) {
        let user = User::new(email.as_str(), password).context("Failed to create seed user")?;
        users.save(&user).await.context("Failed to store seed user")?;
        info!(user_id = %user.id, "Seed user created");
    }

    let state = GatewayState::from_config(config, users, sessions);
    match state.auth.as_ref() {
        Some(auth) => info!(auth_type = %auth.auth_type(), "Request gating enabled"),
        None => warn!("AUTH_TYPE is not set, requests are not gated"),
    }

    let sweeper = start_sweeper(&state);
    let addr = state.config.bind_addr();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(address = %addr, "Gatehouse server running");
    info!("API v1 available at: http://{addr}/api/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "gatehouse_server={level},auth_gateway={level},auth_identity={level},tower_http=info"
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().with_target(false).with_ansi(false).json())
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
