//! axum handlers: translate payloads into application requests, send them
//! through the dispatcher, project the results back out.

use std::sync::Arc;

use application::Dispatcher;
use tokio_util::sync::CancellationToken;

pub mod warehouse_sizes;
pub mod workers;

/// Shared state of every route.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Cancelled when the server shuts down.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, shutdown: CancellationToken) -> Self {
        Self { dispatcher, shutdown }
    }

    /// Token for one request; fires when the server shuts down.
    pub(crate) fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
