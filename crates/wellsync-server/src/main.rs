//! WellSync: fault reporting and semantic fault search server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod changefeed;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("WELLSYNC_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Load configuration, open the store and pick provider backends.
fn build_state() -> anyhow::Result<AppState> {
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = wellsync_core::WellSyncConfig::from_env(&data_dir)?;

    let store = wellsync_store::SqliteStore::open(&config.data_paths.db, config.embedding_dim)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let backends = wellsync_infer::create_backends(&config.provider);

    Ok(AppState::new(config, store, backends))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "backfill" => {
                let state = build_state()?;
                let report = changefeed::backfill_pending(&state).await;
                println!("Embedded: {}", report.embedded);
                println!("Already:  {}", report.already_embedded);
                println!("Failed:   {}", report.failed);
                std::process::exit(if report.failed == 0 { 0 } else { 1 });
            }
            "serve" => {}
            "--help" | "-h" | "help" => {
                println!("WellSync: fault reporting and semantic fault search");
                println!();
                println!("Usage: wellsync [command]");
                println!();
                println!("Commands:");
                println!("  (none) | serve   Start the server");
                println!("  backfill         Embed faults that have no embedding yet, then exit");
                println!("  help             Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'wellsync help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let state = Arc::new(build_state()?);
    let port = state.config.port;

    // Embeds every fault published on the change feed
    changefeed::start_change_feed_worker(state.clone());

    let app = routes::build_router(state.clone());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("WellSync server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
