//! lbcf-admission - admission webhooks for LBCF resources.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Loads configuration from the environment
//! - Creates the Kubernetes client and the LoadBalancerDriver cache
//! - Starts the health server and the webhook server

use std::sync::Arc;
use std::time::Duration;

use kube::Client;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::filter::{Directive, EnvFilter};

use lbcf_admission::health::run_health_server;
use lbcf_admission::validation::WebhookRegistry;
use lbcf_admission::{
    Config, Error, HealthState, Result, WebhookState, driver_lister, run_webhook_server,
};

/// Grace period for in-flight admission requests during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(directive("lbcf_admission=info")?)
                .add_directive(directive("kube=info")?),
        )
        .json()
        .init();

    info!("Starting lbcf-admission");

    let config = Config::from_env()?;
    info!(
        watch_namespace = ?config.watch_namespace,
        webhook_port = config.webhook_port,
        health_port = config.health_port,
        "Loaded configuration"
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately (liveness should work before the cache syncs)
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    // Driver cache backs LoadBalancer admission; readiness follows its initial sync
    let (drivers, driver_watch) = driver_lister(
        client,
        config.watch_namespace.as_deref(),
        Some(health_state.clone()),
    );
    let reflector_handle = tokio::spawn(driver_watch);

    let webhook_state = Arc::new(WebhookState::new(
        WebhookRegistry::default(),
        Arc::new(drivers),
        Some(health_state.clone()),
    ));
    let webhook_handle = {
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = run_webhook_server(webhook_state, &config).await {
                error!("Webhook server error: {}", e);
            }
        })
    };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = webhook_handle => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        result = reflector_handle => {
            if let Err(e) = result {
                error!("Driver reflector task panicked: {}", e);
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready to stop receiving new requests
            health_state.set_ready(false).await;
            info!("Marked service as not ready");

            info!(
                "Waiting {}s for in-flight admission requests to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("lbcf-admission stopped");
    Ok(())
}

fn directive(raw: &str) -> Result<Directive> {
    raw.parse()
        .map_err(|e| Error::Config(format!("invalid log directive {:?}: {}", raw, e)))
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Signal handler setup failures are fatal.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
