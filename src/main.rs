//! HTTP server for the time-bank engine.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{self, Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

use timebank_engine::api::{AppState, create_router};
use timebank_engine::config::{ConfigLoader, EngineConfig};
use timebank_engine::engine::{HoursEngine, StaticDirectory, TracingSink};
use timebank_engine::store::{FileStore, MemoryStore, Repository, Store};

#[derive(Parser, Debug)]
#[command(author, version, about = "Punch hours and time-bank engine")]
struct Args {
    /// Configuration directory holding engine.yaml and employees.yaml.
    /// Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for the JSON collections. Data is kept in memory when omitted.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// TCP listener (e.g. 127.0.0.1:8080)
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let loader = match &args.config {
        Some(dir) => ConfigLoader::load(dir)
            .with_context(|| format!("loading configuration from {}", dir.display()))?,
        None => ConfigLoader::from_parts(EngineConfig::default(), Vec::new()),
    };
    let (config, employees) = loader.into_parts();
    info!(employees = employees.len(), "Configuration loaded");

    let store: Arc<dyn Store> = match &args.data_dir {
        Some(dir) => {
            info!(data_dir = %dir.display(), "Using file store");
            Arc::new(FileStore::new(dir))
        }
        None => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let flush_every = Duration::from_millis(config.notifications.debounce_ms.max(100));
    let engine = Arc::new(HoursEngine::new(
        config,
        Arc::new(Repository::new(store)),
        Arc::new(StaticDirectory::new(employees)),
        Arc::new(TracingSink),
    ));

    let flusher = engine.clone();
    tokio::spawn(async move {
        let mut ticker = time::interval(flush_every);
        loop {
            ticker.tick().await;
            flusher.flush_notifications();
        }
    });

    let app = create_router(AppState::new(engine));
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    info!(listen = %args.listen, "Time-bank engine listening");
    axum::serve(listener, app).await?;
    Ok(())
}
