//! LoadBalancerDriver validation.
//!
//! Validates:
//! - System drivers (in `kube-system`) carry the `lbcf-` prefix, and no other driver does
//! - `spec.driverType` is `Webhook`
//! - Each configured webhook is known, configured once, and times out within one minute
//!
//! Updates may not change the driver's name, URL, or type.

use std::collections::HashSet;

use jiff::SignedDuration;
use kube::ResourceExt;
use tracing::debug;

use super::field::{ErrorList, FieldError, FieldPath};
use super::registry::WebhookRegistry;
use crate::crd::{
    DRIVER_TYPE_WEBHOOK, LoadBalancerDriver, SYSTEM_DRIVER_PREFIX, SYSTEM_NAMESPACE, WebhookConfig,
};

/// Longest timeout a driver webhook may be configured with
pub const MAX_WEBHOOK_TIMEOUT: SignedDuration = SignedDuration::from_secs(60);

/// Validates drivers against a webhook registry.
#[derive(Clone, Copy, Debug)]
pub struct DriverValidator<'r> {
    registry: &'r WebhookRegistry,
}

impl Default for DriverValidator<'static> {
    fn default() -> Self {
        Self::new(WebhookRegistry::known())
    }
}

impl<'r> DriverValidator<'r> {
    pub fn new(registry: &'r WebhookRegistry) -> Self {
        Self { registry }
    }

    /// Validate a driver on create
    pub fn validate(&self, driver: &LoadBalancerDriver) -> ErrorList {
        let name = driver.name_any();
        let namespace = driver.namespace().unwrap_or_default();

        let mut errs = ErrorList::new();
        errs.merge(validate_driver_name(
            &name,
            &namespace,
            &FieldPath::new("metadata").child("name"),
        ));
        errs.merge(validate_driver_type(
            &driver.spec.driver_type,
            &FieldPath::new("spec").child("driverType"),
        ));
        if let Some(webhooks) = &driver.spec.webhooks {
            errs.merge(self.validate_webhooks(webhooks, &FieldPath::new("spec")));
        }

        debug!(
            name = %name,
            namespace = %namespace,
            errors = errs.len(),
            "Validated LoadBalancerDriver"
        );
        errs
    }

    /// Validate a webhook list, with each entry reported under `path.webhooks[i]`.
    ///
    /// An unknown or duplicate entry is reported once and not checked further.
    pub fn validate_webhooks(&self, webhooks: &[WebhookConfig], path: &FieldPath) -> ErrorList {
        let mut errs = ErrorList::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for (i, webhook) in webhooks.iter().enumerate() {
            let cur = path.child("webhooks").index(i);

            if !self.registry.contains(&webhook.name) {
                let supported = self.registry.names();
                errs.push(FieldError::not_supported(
                    cur.child("name"),
                    webhook.name.as_str(),
                    supported.as_slice(),
                ));
                continue;
            }
            if !seen.insert(webhook.name.as_str()) {
                errs.push(FieldError::duplicate(
                    cur.child("name"),
                    webhook.name.as_str(),
                ));
                continue;
            }

            if let Some(timeout) = &webhook.timeout {
                errs.merge(validate_timeout(
                    &webhook.name,
                    timeout,
                    &cur.child("timeout"),
                ));
            }
        }
        errs
    }
}

/// Validate a driver against the known-webhook registry
pub fn validate_driver(driver: &LoadBalancerDriver) -> ErrorList {
    DriverValidator::default().validate(driver)
}

fn validate_driver_name(name: &str, namespace: &str, path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();
    let has_prefix = name.starts_with(SYSTEM_DRIVER_PREFIX);

    if namespace == SYSTEM_NAMESPACE {
        if !has_prefix {
            errs.push(FieldError::invalid(
                path.clone(),
                name,
                format!(
                    "metadata.name must start with {:?} for drivers in namespace {:?}",
                    SYSTEM_DRIVER_PREFIX, SYSTEM_NAMESPACE
                ),
            ));
        }
    } else if has_prefix {
        errs.push(FieldError::invalid(
            path.clone(),
            name,
            format!(
                "metadata.name must not start with {:?} for drivers not in namespace {:?}",
                SYSTEM_DRIVER_PREFIX, SYSTEM_NAMESPACE
            ),
        ));
    }
    errs
}

fn validate_driver_type(driver_type: &str, path: &FieldPath) -> ErrorList {
    if driver_type == DRIVER_TYPE_WEBHOOK {
        return ErrorList::new();
    }
    FieldError::invalid(
        path.clone(),
        driver_type,
        format!("driverType must be {}", DRIVER_TYPE_WEBHOOK),
    )
    .into()
}

// Accepts jiff's ISO 8601 and friendly formats, plus the unitless zero
// ("0", "+0", "-0") that Go-style durations allow.
fn parse_timeout(timeout: &str) -> Result<SignedDuration, jiff::Error> {
    match timeout {
        "0" | "+0" | "-0" => Ok(SignedDuration::ZERO),
        _ => timeout.parse(),
    }
}

fn validate_timeout(webhook: &str, timeout: &str, path: &FieldPath) -> ErrorList {
    match parse_timeout(timeout) {
        Ok(duration) if duration > MAX_WEBHOOK_TIMEOUT => FieldError::invalid(
            path.clone(),
            timeout,
            format!(
                "webhook {} invalid, timeout must be less than or equal to 1m",
                webhook
            ),
        )
        .into(),
        Ok(_) => ErrorList::new(),
        Err(e) => FieldError::invalid(
            path.clone(),
            timeout,
            format!("webhook {} invalid, timeout is not a valid duration: {}", webhook, e),
        )
        .into(),
    }
}

/// Whether an update keeps the driver's immutable fields.
///
/// The webhook list may change; name, URL, and driver type may not.
pub fn driver_update_allowed(cur: &LoadBalancerDriver, old: &LoadBalancerDriver) -> bool {
    cur.name_any() == old.name_any()
        && cur.spec.url == old.spec.url
        && cur.spec.driver_type == old.spec.driver_type
}
