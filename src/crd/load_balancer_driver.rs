//! LoadBalancerDriver Custom Resource Definition.
//!
//! A driver is a webhook server that knows how to talk to one kind of load
//! balancer. Drivers in `kube-system` are shared system drivers and carry the
//! reserved `lbcf-` name prefix.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The only driver type currently supported.
pub const DRIVER_TYPE_WEBHOOK: &str = "Webhook";

/// LoadBalancerDriver registers a driver webhook server.
///
/// Example:
/// ```yaml
/// apiVersion: lbcf.tkestack.io/v1beta1
/// kind: LoadBalancerDriver
/// metadata:
///   name: lbcf-clb-driver
///   namespace: kube-system
/// spec:
///   driverType: Webhook
///   url: "http://lbcf-clb-driver.kube-system.svc"
///   webhooks:
///     - name: ensureLoadBalancer
///       timeout: 30s
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "lbcf.tkestack.io",
    version = "v1beta1",
    kind = "LoadBalancerDriver",
    plural = "loadbalancerdrivers",
    shortname = "lbdriver",
    namespaced,
    printcolumn = r#"{"name":"Type", "type":"string", "jsonPath":".spec.driverType"}"#,
    printcolumn = r#"{"name":"URL", "type":"string", "jsonPath":".spec.url"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerDriverSpec {
    /// Driver type. Must be `Webhook`.
    #[serde(default)]
    pub driver_type: String,

    /// Base URL of the driver webhook server.
    #[serde(default)]
    pub url: String,

    /// Per-webhook configuration. Webhooks not listed use default settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<Vec<WebhookConfig>>,
}

/// Configuration of a single driver webhook.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// Webhook name, e.g. `ensureLoadBalancer`.
    pub name: String,

    /// Call timeout as a duration string (e.g. `10s`, `1m`). At most one minute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

impl WebhookConfig {
    /// Create a webhook config without a timeout
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout: None,
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }
}
