//! Admission policies for LBCF resources.
//!
//! Policies are organized into tiers:
//! - Tier 1 (Critical): Field validation, always enforced
//! - Tier 2 (Update): Only enforced on UPDATE operations (immutability)
//!
//! Tier 1 reports every field violation in one denial. Tier 2 checks are
//! boolean and deny without field detail.

pub mod backend_group;
pub mod driver;
pub mod load_balancer;

use crate::validation::ErrorList;

/// Result of a validation check
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub allowed: bool,
    /// Reason for denial (if not allowed)
    pub reason: Option<String>,
    /// Detailed message (if not allowed)
    pub message: Option<String>,
    /// Field violations behind a denial, empty for boolean checks
    pub errors: ErrorList,
}

impl ValidationResult {
    /// Create an allowed result
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
            errors: ErrorList::new(),
        }
    }

    /// Create a denied result
    pub fn denied(reason: &str, message: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            message: Some(message.to_string()),
            errors: ErrorList::new(),
        }
    }

    /// Allowed if `errors` is empty, otherwise denied with every violation in the message
    pub fn from_errors(reason: &str, errors: ErrorList) -> Self {
        if errors.is_empty() {
            return Self::allowed();
        }
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            message: Some(errors.to_aggregate_message()),
            errors,
        }
    }
}

/// Context for validation
pub struct ValidationContext<'a, K> {
    /// The resource being validated
    pub resource: &'a K,
    /// The old resource (for UPDATE operations)
    pub old_resource: Option<&'a K>,
    /// Whether this is a dry-run request
    pub dry_run: bool,
    /// The namespace of the resource
    pub namespace: Option<&'a str>,
}

impl<K> ValidationContext<'_, K> {
    /// Check if this is an UPDATE operation
    pub fn is_update(&self) -> bool {
        self.old_resource.is_some()
    }
}
