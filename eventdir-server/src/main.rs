mod routes;
mod singleton;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use eventdir_core::{EventDirConfig, HttpStore, MemoryStore, RecordStore};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "eventdir-server")]
#[command(about = "Serve directory timeline and calendar views as JSON")]
struct Args {
    /// Address to listen on (overrides listen_addr from the config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Serve a fixed JSON snapshot instead of the configured store
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn open_store(config: &EventDirConfig, snapshot: Option<&PathBuf>) -> Result<Arc<dyn RecordStore>> {
    match snapshot {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read snapshot {}", path.display()))?;
            Ok(Arc::new(MemoryStore::from_snapshot(&json)?))
        }
        None => Ok(Arc::new(HttpStore::from_config(config)?)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eventdir=info")),
        )
        .init();

    let args = Args::parse();
    let config = EventDirConfig::load()?;
    let listen_addr = args.listen.unwrap_or_else(|| config.listen_addr.clone());

    // Ensure only one instance serves this address
    let _lock = singleton::acquire_lock(&listen_addr)?;

    let store = open_store(&config, args.snapshot.as_ref())?;
    let state = AppState::start(store, config.grid_options()).await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Could not bind {listen_addr}"))?;
    info!("eventdir-server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
