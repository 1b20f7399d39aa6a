//! Admission webhook server.
//!
//! Provides HTTP endpoints for Kubernetes admission webhooks:
//! - `/validate-loadbalancerdriver`
//! - `/validate-loadbalancer`
//! - `/validate-backendgroup`
//!
//! To enable webhooks:
//! 1. Deploy cert-manager for TLS certificates
//! 2. Create a ValidatingWebhookConfiguration pointing at the routes above
//! 3. Mount the TLS certificate secret to the pod at /etc/webhook/certs/
//!
//! Without certificates the server falls back to plain HTTP, which is only
//! useful behind a TLS-terminating proxy or for local testing.

use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use kube::Resource;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::crd::{BackendGroup, LoadBalancer, LoadBalancerDriver};
use crate::error::{Error, Result};
use crate::health::HealthState;
use crate::lister::ResourceLister;
use crate::validation::WebhookRegistry;
use crate::webhooks::policies::{self, ValidationContext, ValidationResult};

/// Shared state for webhook handlers
pub struct WebhookState {
    /// Webhook names drivers may configure
    pub registry: WebhookRegistry,
    /// Driver lookups for LoadBalancer admission
    pub drivers: Arc<dyn ResourceLister<LoadBalancerDriver>>,
    /// Optional health state for metrics
    pub health_state: Option<Arc<HealthState>>,
}

impl WebhookState {
    pub fn new(
        registry: WebhookRegistry,
        drivers: Arc<dyn ResourceLister<LoadBalancerDriver>>,
        health_state: Option<Arc<HealthState>>,
    ) -> Self {
        Self {
            registry,
            drivers,
            health_state,
        }
    }

    /// Decide a LoadBalancerDriver admission review
    pub fn review_driver(
        &self,
        review: AdmissionReview<LoadBalancerDriver>,
    ) -> (StatusCode, AdmissionReview<DynamicObject>) {
        self.admit(review, |ctx| policies::driver::validate(ctx, &self.registry))
    }

    /// Decide a LoadBalancer admission review
    pub fn review_load_balancer(
        &self,
        review: AdmissionReview<LoadBalancer>,
    ) -> (StatusCode, AdmissionReview<DynamicObject>) {
        self.admit(review, |ctx| {
            policies::load_balancer::validate(ctx, self.drivers.as_ref())
        })
    }

    /// Decide a BackendGroup admission review
    pub fn review_backend_group(
        &self,
        review: AdmissionReview<BackendGroup>,
    ) -> (StatusCode, AdmissionReview<DynamicObject>) {
        self.admit(review, policies::backend_group::validate)
    }

    fn admit<K, F>(
        &self,
        review: AdmissionReview<K>,
        policy: F,
    ) -> (StatusCode, AdmissionReview<DynamicObject>)
    where
        K: Resource<DynamicType = ()>,
        F: FnOnce(&ValidationContext<'_, K>) -> ValidationResult,
    {
        let start = Instant::now();
        let kind = K::kind(&()).to_string();

        let request: AdmissionRequest<K> = match review.try_into() {
            Ok(req) => req,
            Err(e) => {
                error!(kind = %kind, error = %e, "Failed to extract admission request");
                return (
                    StatusCode::BAD_REQUEST,
                    AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e))
                        .into_review(),
                );
            }
        };

        let uid = &request.uid;
        let operation = format!("{:?}", request.operation).to_uppercase();
        debug!(
            uid = %uid,
            kind = %kind,
            operation = %operation,
            namespace = ?request.namespace,
            name = %request.name,
            "Processing admission request"
        );

        let result = if request.operation == Operation::Delete {
            ValidationResult::allowed()
        } else if let Some(resource) = request.object.as_ref() {
            let ctx = ValidationContext {
                resource,
                old_resource: request.old_object.as_ref(),
                dry_run: request.dry_run,
                namespace: request.namespace.as_deref(),
            };
            policy(&ctx)
        } else {
            ValidationResult::denied("InvalidRequest", "Missing object in request")
        };

        if let Some(health) = &self.health_state {
            health.metrics.record_admission(
                &kind,
                &operation,
                result.allowed,
                start.elapsed().as_secs_f64(),
            );
        }

        if result.allowed {
            info!(uid = %uid, kind = %kind, operation = %operation, "Admission request allowed");
            return (
                StatusCode::OK,
                AdmissionResponse::from(&request).into_review(),
            );
        }

        let reason = result
            .reason
            .unwrap_or_else(|| "ValidationFailed".to_string());
        let message = result
            .message
            .unwrap_or_else(|| "Validation failed".to_string());
        warn!(
            uid = %uid,
            kind = %kind,
            operation = %operation,
            reason = %reason,
            violations = result.errors.len(),
            dry_run = request.dry_run,
            message = %message,
            "Admission request denied"
        );
        (
            StatusCode::OK,
            deny_with_reason(&request, &message, &reason),
        )
    }
}

/// Create a denial response with reason embedded in message.
/// kube-rs deny() only sets status.message, so we format as "[reason] message"
fn deny_with_reason<T: Resource<DynamicType = ()>>(
    request: &AdmissionRequest<T>,
    message: &str,
    reason: &str,
) -> AdmissionReview<DynamicObject> {
    let full_message = format!("[{}] {}", reason, message);
    AdmissionResponse::from(request)
        .deny(full_message)
        .into_review()
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/validate-loadbalancerdriver", post(validate_driver))
        .route("/validate-loadbalancer", post(validate_load_balancer))
        .route("/validate-backendgroup", post(validate_backend_group))
        .with_state(state)
}

async fn validate_driver(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<LoadBalancerDriver>>,
) -> impl IntoResponse {
    let (status, review) = state.review_driver(review);
    (status, Json(review))
}

async fn validate_load_balancer(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<LoadBalancer>>,
) -> impl IntoResponse {
    let (status, review) = state.review_load_balancer(review);
    (status, Json(review))
}

async fn validate_backend_group(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<BackendGroup>>,
) -> impl IntoResponse {
    let (status, review) = state.review_backend_group(review);
    (status, Json(review))
}

/// Run the webhook server on `0.0.0.0:{config.webhook_port}`.
///
/// Serves TLS when both the certificate and key from `config` exist.
pub async fn run_webhook_server(state: Arc<WebhookState>, config: &Config) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::net::SocketAddr;

    let app = create_webhook_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));

    if !config.tls_available() {
        warn!(
            port = config.webhook_port,
            cert_path = %config.cert_path.display(),
            "Webhook certificates not found, serving plain HTTP"
        );
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;
        return Ok(());
    }

    let tls = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .map_err(|e| Error::TlsConfig(e.to_string()))?;

    info!(port = config.webhook_port, "Webhook server listening with TLS");
    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    Ok(())
}
