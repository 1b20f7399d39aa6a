//! lbcf-admission library crate
//!
//! Validation rules and admission webhooks for the LoadBalancerDriver,
//! LoadBalancer and BackendGroup resources of the load balancer controlling
//! framework.
//!
//! The [`validation`] module is the rule engine and has no I/O. The remaining
//! modules wrap it into a service: CRD types, resource lookups, admission
//! policies and the HTTP servers.

pub mod config;
pub mod crd;
pub mod error;
pub mod health;
pub mod lister;
pub mod validation;
pub mod webhooks;

pub use config::Config;
pub use error::{Error, Result};
pub use health::HealthState;
pub use webhooks::{WebhookState, run_webhook_server};

use std::sync::Arc;

use futures::StreamExt;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::{WatchStreamExt, reflector, watcher};
use kube::{Api, Client};
use tracing::{debug, error, info};

use crd::LoadBalancerDriver;
use lister::StoreLister;

/// Create namespaced or cluster-wide API based on scope
pub fn scoped_api(client: Client, namespace: Option<&str>) -> Api<LoadBalancerDriver> {
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

/// Start a reflector caching LoadBalancerDrivers.
///
/// Returns a lister over the cache and a future that drives the watch; the
/// future must be polled (usually spawned) for the cache to fill. The lister
/// answers lookups, and readiness is marked, once the initial list has been
/// received.
pub fn driver_lister(
    client: Client,
    namespace: Option<&str>,
    health_state: Option<Arc<HealthState>>,
) -> (
    StoreLister<LoadBalancerDriver>,
    impl std::future::Future<Output = ()> + Send + 'static,
) {
    let api = scoped_api(client, namespace);
    let (reader, writer) = reflector::store();
    let lister = StoreLister::new(reader);
    let synced = lister.wait_synced();
    let scope = namespace.unwrap_or("cluster-wide").to_string();

    let watch = async move {
        info!(scope = %scope, "Starting LoadBalancerDriver reflector");
        let stream = reflector(writer, watcher(api, WatcherConfig::default().any_semantic()))
            .default_backoff()
            .applied_objects();

        let ready = async move {
            if synced.await {
                info!("LoadBalancerDriver cache synced");
                if let Some(state) = health_state {
                    state.set_ready(true).await;
                }
            }
        };

        let drain = stream.for_each(|event| async move {
            match event {
                Ok(driver) => debug!(name = ?driver.metadata.name, "Driver cache updated"),
                Err(e) => error!("Driver watch error: {:?}", e),
            }
        });

        futures::join!(ready, drain);
        error!("LoadBalancerDriver reflector ended unexpectedly");
    };

    (lister, watch)
}
