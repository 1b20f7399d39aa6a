//! Validation rules for LBCF resources.
//!
//! Create-time validators return an [`ErrorList`] holding every violation
//! found, each tagged with its [`FieldPath`]. Update checks are boolean: they
//! only decide whether the changed fields are within the allowed delta.
//!
//! | Resource | Create | Update |
//! |----------|--------|--------|
//! | LoadBalancerDriver | [`validate_driver`] / [`DriverValidator`] | [`driver_update_allowed`] |
//! | LoadBalancer | (none) | [`lb_update_allowed`] |
//! | BackendGroup | [`validate_backend_group`] | [`backend_group_update_allowed`] |
//!
//! All validators are pure functions of their inputs and safe to call
//! concurrently.

pub mod backend_group;
pub mod driver;
pub mod field;
pub mod load_balancer;
pub mod registry;

pub use backend_group::{
    backend_group_update_allowed, validate_backend_group, validate_backends,
    validate_port_selector,
};
pub use driver::{DriverValidator, MAX_WEBHOOK_TIMEOUT, driver_update_allowed, validate_driver};
pub use field::{ErrorList, ErrorType, FieldError, FieldPath};
pub use load_balancer::lb_update_allowed;
pub use registry::{KNOWN_WEBHOOKS, WebhookRegistry};
