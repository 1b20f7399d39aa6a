//! LoadBalancer admission policy.
//!
//! Tier 1 (Critical): on CREATE, the referenced driver must exist
//! Tier 2 (Update): name, spec.lbDriver and spec.lbSpec are immutable

use kube::ResourceExt;
use tracing::warn;

use super::{ValidationContext, ValidationResult};
use crate::crd::{LoadBalancer, LoadBalancerDriver, driver_namespace};
use crate::lister::{ListerError, ResourceLister};
use crate::validation::lb_update_allowed;

/// Validate a load balancer admission request
pub fn validate(
    ctx: &ValidationContext<'_, LoadBalancer>,
    drivers: &dyn ResourceLister<LoadBalancerDriver>,
) -> ValidationResult {
    let Some(old) = ctx.old_resource else {
        return validate_driver_exists(ctx, drivers);
    };

    if !lb_update_allowed(ctx.resource, old) {
        return ValidationResult::denied(
            "ImmutableFieldChanged",
            "LoadBalancer name, spec.lbDriver and spec.lbSpec cannot be changed",
        );
    }

    ValidationResult::allowed()
}

fn validate_driver_exists(
    ctx: &ValidationContext<'_, LoadBalancer>,
    drivers: &dyn ResourceLister<LoadBalancerDriver>,
) -> ValidationResult {
    let lb = ctx.resource;
    let lb_namespace = ctx
        .namespace
        .map(str::to_string)
        .or_else(|| lb.namespace())
        .unwrap_or_default();
    let driver_name = &lb.spec.lb_driver;
    let namespace = driver_namespace(driver_name, &lb_namespace);

    match drivers.get(namespace, driver_name) {
        Ok(_) => ValidationResult::allowed(),
        Err(ListerError::NotFound { .. }) => ValidationResult::denied(
            "DriverNotFound",
            &format!(
                "LoadBalancerDriver {}/{} referenced by spec.lbDriver does not exist",
                namespace, driver_name
            ),
        ),
        Err(e) => {
            warn!(driver = %driver_name, namespace = %namespace, error = %e, "Driver lookup failed");
            ValidationResult::denied("LookupFailed", &e.to_string())
        }
    }
}
