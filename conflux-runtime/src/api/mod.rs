//! API Module
//!
//! HTTP status endpoint served next to the running pipeline.

pub mod status;

use axum::Router;
use conflux_core::domain::service::ServiceInfo;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Create the status router
///
/// Every path is answered by the status handler.
pub fn create_router(info: Arc<ServiceInfo>) -> Router {
    Router::new()
        .fallback(status::service_status)
        .with_state(info)
        .layer(TraceLayer::new_for_http())
}

/// Serves the status endpoint on an already bound listener
pub async fn serve(listener: TcpListener, info: Arc<ServiceInfo>) -> std::io::Result<()> {
    axum::serve(listener, create_router(info)).await
}

/// Starts the status endpoint in the background
///
/// Failures are logged and never reach the caller; the task lives as long
/// as the process.
pub fn spawn_status_server(addr: String, info: Arc<ServiceInfo>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to start status endpoint on {}: {}", addr, e);
                return;
            }
        };

        info!("Status endpoint listening on {}", addr);

        if let Err(e) = serve(listener, info).await {
            error!("Status endpoint failed: {}", e);
        }
    })
}
