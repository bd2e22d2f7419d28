use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, debug, trace, error};

use crate::config::{initialize_app_state, DatasetArgs, QueryLimits};
use crate::router::create_router_with_metrics;

pub async fn serve(dataset: &DatasetArgs, limits: &QueryLimits, bind_address: &str) -> Result<()> {
    trace!("Entering serve function");
    info!("gridload application starting up");
    debug!("Dataset pattern: {}", dataset.pattern);
    debug!("Bind address: {}", bind_address);
    debug!(
        "Query limits - timeout: {}s, concurrency: {}",
        limits.query_timeout_secs, limits.max_concurrent_queries
    );

    // Initialize application state
    trace!("Initializing application state");
    let state = match initialize_app_state(dataset, limits) {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {:#}", e);
            return Err(e);
        }
    };

    // Create router
    trace!("Creating application router");
    let app = create_router_with_metrics(state);
    debug!("Router created successfully");

    // Start server
    info!("Starting server on {}", bind_address);
    trace!("Attempting to bind TCP listener to {}", bind_address);
    let listener = match TcpListener::bind(bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("gridload API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);
    info!("Prometheus metrics available at http://{}/metrics", bind_address);
    debug!("Server is ready to accept connections");

    trace!("Starting axum server");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
