//! `warehouse-admin` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`   — start the administrator API.
//! - `migrate` — run pending database migrations.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use db::pool::PoolSettings;
use db::{InMemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(
    name = "warehouse-admin",
    about = "Administrative backend for warehouse workers and warehouse sizes",
    version
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "WAREHOUSE_BIND", default_value = "0.0.0.0:8080")]
        bind: String,
        /// Postgres URL.  Without one the server keeps data in memory.
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
        #[arg(long, default_value_t = 10)]
        max_connections: u32,
    },
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Cancel `shutdown` once Ctrl-C arrives.  A listener that failed to install
/// leaves the server running; it can still be stopped by other means.
fn on_ctrl_c(signal: std::io::Result<()>, shutdown: &CancellationToken) {
    match signal {
        Ok(()) => {
            info!("shutdown requested");
            shutdown.cancel();
        }
        Err(err) => error!("failed to listen for Ctrl-C: {err}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve { bind, database_url, max_connections } => {
            let store: Arc<dyn Store> = match database_url {
                Some(url) => {
                    let settings = PoolSettings { database_url: url, max_connections };
                    let pool = db::pool::create_pool(&settings)
                        .await
                        .context("failed to connect to database")?;
                    Arc::new(PgStore::new(pool))
                }
                None => {
                    warn!("DATABASE_URL not set, using the in-memory store");
                    Arc::new(InMemoryStore::new())
                }
            };

            let dispatcher = application::warehouse_dispatcher(store)
                .context("handler registry is inconsistent")?;

            let shutdown = CancellationToken::new();
            tokio::spawn({
                let shutdown = shutdown.clone();
                async move { on_ctrl_c(tokio::signal::ctrl_c().await, &shutdown) }
            });

            info!("Starting API server on {bind}");
            let state = api::AppState::new(Arc::new(dispatcher), shutdown);
            api::serve(&bind, state).await.context("API server failed")?;
        }
        Command::Migrate { database_url } => {
            let settings = PoolSettings {
                max_connections: 2,
                ..PoolSettings::new(database_url)
            };
            let pool = db::pool::create_pool(&settings)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
        }
    }

    Ok(())
}
