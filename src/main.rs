use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsdesk::api::{self, AppState};
use newsdesk::backend::BackendClient;
use newsdesk::config::GatewayConfig;

/// How often expired sessions and idle rate-limit entries are dropped.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "API gateway for the newsdesk portal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway
    Serve {
        /// Port for the HTTP API (overrides NEWSDESK_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind host (overrides NEWSDESK_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Backend base URL (overrides BACKEND_URL)
        #[arg(short, long)]
        backend_url: Option<String>,
    },
    /// Check that the backend is reachable
    Status {
        /// Backend base URL (overrides BACKEND_URL)
        #[arg(short, long)]
        backend_url: Option<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "newsdesk=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    let addr = config.bind_address();
    tracing::info!("Proxying to backend at {}", config.backend_url);

    let state = AppState::new(config)?;

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.sweep();
        }
    });

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("newsdesk gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn status(config: GatewayConfig) -> anyhow::Result<()> {
    let client = BackendClient::new(&config.backend_url)?;
    match client.health().await {
        Ok(reply) => {
            println!("Backend {} is up ({})", client.base_url(), reply.status);
            Ok(())
        }
        Err(e) => anyhow::bail!("Backend {} is unreachable: {}", client.base_url(), e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = GatewayConfig::from_env();

    match cli.command {
        Some(Commands::Serve {
            port,
            host,
            backend_url,
        }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(url) = backend_url {
                config.backend_url = url;
            }
            serve(config).await?;
        }
        Some(Commands::Status { backend_url }) => {
            if let Some(url) = backend_url {
                config.backend_url = url;
            }
            status(config).await?;
        }
        None => serve(config).await?,
    }

    Ok(())
}
