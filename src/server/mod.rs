//! HTTP surface (`server` feature).
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /predit/text` | Segment a document and classify each segment through the batcher |
//! | `GET /health` | Liveness plus aggregate batch counters |

mod error;
mod handlers;
mod routes;
pub mod types;

pub use error::ApiError;
pub use routes::create_router;

use crate::batch::{BatchStats, RequestGate};
use crate::config::ServerConfig;
use crate::Result;
use std::sync::Arc;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    gate: RequestGate,
    segment_length: usize,
    stats: Option<Arc<BatchStats>>,
}

impl AppState {
    pub fn new(gate: RequestGate, segment_length: usize) -> Self {
        Self {
            gate,
            segment_length,
            stats: None,
        }
    }

    /// Report these counters on `/health`.
    pub fn with_stats(mut self, stats: Arc<BatchStats>) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Bind and serve until Ctrl-C.
///
/// The router (and with it every gate clone) is dropped on return, which lets
/// the aggregator drain and stop.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = create_router(state);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
