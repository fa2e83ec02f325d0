//! Kube Panel - web back end for a Kubernetes dashboard
//!
//! Serves summaries, manifests and cluster metrics of a single cluster,
//! talking to its API server with a static bearer token.

use anyhow::Result;
use kube_panel::{api, config::PanelConfig};
use panel_lib::{
    gateway::HttpGateway,
    health::{components, HealthRegistry},
    Dashboard,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PANEL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting kube-panel");

    let config = PanelConfig::load()?;
    info!(
        api_url = %config.kube_api_url,
        listen_port = config.listen_port,
        "Panel configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::KUBE_API).await;

    let gateway = Arc::new(HttpGateway::new(config.kube_config()?)?);
    let dashboard = Dashboard::new(gateway, health_registry.clone());
    let logger = dashboard.logger().clone();
    logger.log_startup(PANEL_VERSION, config.listen_port);

    // Startup probe of the API server
    match dashboard.api_versions().await {
        Ok(_) => info!("Kubernetes API reachable"),
        Err(e) => {
            warn!(error = %e, "Kubernetes API probe failed");
            health_registry
                .set_unhealthy(components::KUBE_API, e.to_string())
                .await;
        }
    }

    let app_state = Arc::new(api::AppState::new(dashboard, health_registry.clone()));

    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.listen_port, app_state));

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
        result = api_handle => {
            let reason = match result {
                Ok(Ok(())) => "API server stopped".to_string(),
                Ok(Err(e)) => format!("API server failed: {}", e),
                Err(e) => format!("API server task panicked: {}", e),
            };
            logger.log_shutdown(&reason);
        }
    }

    info!("Shutting down");
    Ok(())
}
