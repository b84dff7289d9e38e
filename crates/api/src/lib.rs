//! `api` crate — HTTP transport for the administrator endpoints.
//!
//! Exposes:
//!   POST   /administrator/worker
//!   PUT    /administrator/worker
//!   GET    /administrator/worker/{id}
//!   DELETE /administrator/worker/{id}
//!   GET    /administrator/workers
//!   POST   /administrator/warehouse-size
//!   PUT    /administrator/warehouse-size
//!   GET    /administrator/warehouse-size/{id}
//!   DELETE /administrator/warehouse-size/{id}
//!   GET    /administrator/warehouse-sizes
//!   GET    /health

pub mod contracts;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiError, Problem};
pub use handlers::AppState;

use handlers::{warehouse_sizes, workers};

/// Build the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/administrator/worker",
            post(workers::create).put(workers::update),
        )
        .route(
            "/administrator/worker/:id",
            get(workers::get).delete(workers::delete),
        )
        .route("/administrator/workers", get(workers::list))
        .route(
            "/administrator/warehouse-size",
            post(warehouse_sizes::create).put(warehouse_sizes::update),
        )
        .route(
            "/administrator/warehouse-size/:id",
            get(warehouse_sizes::get).delete(warehouse_sizes::delete),
        )
        .route("/administrator/warehouse-sizes", get(warehouse_sizes::list))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `bind` until `state.shutdown` is cancelled.  In-flight
/// requests observe the same cancellation through their request tokens.
pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("API listening on {}", listener.local_addr()?);

    let shutdown = state.shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("API stopped");
    Ok(())
}
