//! LoadBalancer Custom Resource Definition.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// LoadBalancer is a load balancer instance operated through a driver.
///
/// Example:
/// ```yaml
/// apiVersion: lbcf.tkestack.io/v1beta1
/// kind: LoadBalancer
/// metadata:
///   name: a-lb
///   namespace: kube-system
/// spec:
///   lbDriver: lbcf-clb-driver
///   lbSpec:
///     vpcID: vpc-b5hcoxj4
///     loadBalancerType: OPEN
///   attributes:
///     idleTimeout: "60"
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "lbcf.tkestack.io",
    version = "v1beta1",
    kind = "LoadBalancer",
    plural = "loadbalancers",
    shortname = "lb",
    namespaced,
    printcolumn = r#"{"name":"Driver", "type":"string", "jsonPath":".spec.lbDriver"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    /// Name of the LoadBalancerDriver operating this load balancer.
    #[serde(default)]
    pub lb_driver: String,

    /// Driver-specific load balancer parameters. Opaque to LBCF and immutable.
    #[serde(default)]
    pub lb_spec: BTreeMap<String, String>,

    /// Driver-specific attributes that may change over the load balancer's life.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// How often the load balancer is re-ensured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensure_policy: Option<EnsurePolicyConfig>,
}

/// Re-ensure policy for a load balancer or backend group.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnsurePolicyConfig {
    /// `IfNotSucc` (default) or `Always`.
    #[serde(default = "default_ensure_policy")]
    pub policy: String,

    /// Resync period when policy is `Always`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resync_period_in_seconds: Option<i32>,
}

fn default_ensure_policy() -> String {
    "IfNotSucc".to_string()
}
