use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use company_employees::config::AppConfig;
use company_employees::database::{manager, MemoryStore, PgRepository, RepositoryManager};
use company_employees::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "company-employees")]
#[command(about = "Company and employee REST API with data shaping and HATEOAS links")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Postgres connection string; overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    /// Ignore any configured database and serve from memory
    #[arg(long)]
    in_memory: bool,

    /// Preload the in-memory store with sample companies and employees
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let args = Args::parse();

    let mut config = company_employees::config::config().clone();
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }
    if args.in_memory {
        config.database.url = None;
    }
    tracing::info!("Starting Company Employees API in {:?} mode", config.environment);

    let repository = build_repository(&config, args.seed).await?;
    let state = AppState::new(config, repository).context("invalid public base URL")?;

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("server error")?;

    Ok(())
}

async fn build_repository(config: &AppConfig, seed: bool) -> anyhow::Result<RepositoryManager> {
    if config.database.url.is_some() {
        let pool = manager::connect(&config.database).await?;
        return Ok(RepositoryManager::from_store(Arc::new(PgRepository::new(pool))));
    }

    tracing::warn!("No database configured, using the in-memory store");
    let store = if seed { MemoryStore::seeded() } else { MemoryStore::new() };
    Ok(RepositoryManager::from_store(Arc::new(store)))
}
