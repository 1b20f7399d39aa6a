//! LoadBalancerDriver admission policy.
//!
//! Tier 1 (Critical): name prefix, driver type, and webhook configuration
//! Tier 2 (Update): name, URL, and driver type are immutable

use super::{ValidationContext, ValidationResult};
use crate::crd::LoadBalancerDriver;
use crate::validation::{DriverValidator, WebhookRegistry, driver_update_allowed};

/// Validate a driver admission request
pub fn validate(
    ctx: &ValidationContext<'_, LoadBalancerDriver>,
    registry: &WebhookRegistry,
) -> ValidationResult {
    let errors = DriverValidator::new(registry).validate(ctx.resource);
    let result = ValidationResult::from_errors("InvalidLoadBalancerDriver", errors);
    if !result.allowed {
        return result;
    }

    if let Some(old) = ctx.old_resource {
        if !driver_update_allowed(ctx.resource, old) {
            return ValidationResult::denied(
                "ImmutableFieldChanged",
                "LoadBalancerDriver name, spec.url and spec.driverType cannot be changed",
            );
        }
    }

    ValidationResult::allowed()
}
