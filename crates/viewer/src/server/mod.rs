//! HTTP serving layer: a thin axum adapter over the query surface.

pub mod map;
pub mod route;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::state::SharedSnapshot;

pub use route::build_router;

/// Bind and serve the API until ctrl-c or SIGTERM.
pub async fn serve(addr: SocketAddr, snapshot: SharedSnapshot) -> Result<()> {
    let app = build_router(snapshot);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("listening on http://{addr}");
    info!("  - tree:   http://{addr}/api/tree");
    info!("  - stats:  http://{addr}/api/stats");
    info!("  - logs:   http://{addr}/api/logs?span={{id}}");
    info!("  - search: http://{addr}/api/search?q={{substring}}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install ctrl-c handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("received ctrl-c, shutting down"),
        _ = terminate => warn!("received SIGTERM, shutting down"),
    }
}
