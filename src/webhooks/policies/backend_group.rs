//! BackendGroup admission policy.
//!
//! Tier 1 (Critical): backend selection and port validation
//! Tier 2 (Update): the backend selection strategy cannot change

use super::{ValidationContext, ValidationResult};
use crate::crd::{BackendGroup, resolve_strategy};
use crate::validation::{backend_group_update_allowed, validate_backend_group};

/// Validate a backend group admission request
pub fn validate(ctx: &ValidationContext<'_, BackendGroup>) -> ValidationResult {
    let result = ValidationResult::from_errors(
        "InvalidBackendGroup",
        validate_backend_group(ctx.resource),
    );
    if !result.allowed {
        return result;
    }

    if let Some(old) = ctx.old_resource {
        if !backend_group_update_allowed(ctx.resource, old) {
            return ValidationResult::denied(
                "BackendTypeChanged",
                &format!(
                    "backend type cannot change from {} to {}",
                    resolve_strategy(&old.spec),
                    resolve_strategy(&ctx.resource.spec)
                ),
            );
        }
    }

    ValidationResult::allowed()
}
