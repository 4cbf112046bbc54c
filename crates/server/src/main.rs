//! Labwise server.
//!
//! Serves lab test search, price comparison and booking over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Demo catalog in memory
//! labwise
//!
//! # Against a hosted PostgREST/Supabase project
//! LABWISE_BACKEND=postgrest \
//! LABWISE_BACKEND_URL=https://abc.supabase.co \
//! LABWISE_BACKEND_API_KEY=... \
//! labwise --port 3000
//! ```

use clap::Parser;
use labwise_persistence::backends::memory::MemoryBackend;
use labwise_rest::{BackendKind, ServerConfig, create_app_with_config, init_logging};
use tracing::info;

#[cfg(feature = "postgrest")]
use labwise_persistence::backends::postgrest::PostgrestBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        backend = %config.backend,
        "Starting Labwise server"
    );

    match config.backend {
        BackendKind::Memory => start_memory(config).await,
        BackendKind::Postgrest => start_postgrest(config).await,
    }
}

async fn start_memory(config: ServerConfig) -> anyhow::Result<()> {
    let backend = if config.seed_demo_data {
        info!("Loading demo catalog into memory backend");
        MemoryBackend::seeded()
    } else {
        MemoryBackend::new()
    };

    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}

#[cfg(feature = "postgrest")]
async fn start_postgrest(config: ServerConfig) -> anyhow::Result<()> {
    let pg_config = config
        .postgrest_config()
        .map_err(|e| anyhow::anyhow!(e))?;

    info!(url = %pg_config.base_url, "Connecting to PostgREST backend");
    let backend = PostgrestBackend::new(pg_config)?;

    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}

#[cfg(not(feature = "postgrest"))]
async fn start_postgrest(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The postgrest backend requires the 'postgrest' feature. \
         Build with: cargo build -p labwise-server --features postgrest"
    )
}

async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
