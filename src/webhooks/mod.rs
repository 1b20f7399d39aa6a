//! Webhook module for validating admission requests.
//!
//! This module provides ValidatingAdmissionWebhooks with tiered validation policies:
//! - Tier 1 (Critical): Always enforced (field validation, driver existence)
//! - Tier 2 (Update): Only on UPDATE operations (immutability)

pub mod policies;
mod server;

pub use policies::{ValidationContext, ValidationResult};
pub use server::{WebhookState, create_webhook_router, run_webhook_server};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
