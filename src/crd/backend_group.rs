//! BackendGroup Custom Resource Definition.
//!
//! A BackendGroup selects backends in exactly one of three ways: the nodes
//! behind a Service, a set of Pods, or a static list of addresses. The
//! selection strategy is fixed once the group is created.

use std::collections::BTreeMap;
use std::fmt;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// BackendGroup binds a group of backends to a load balancer.
///
/// Example:
/// ```yaml
/// apiVersion: lbcf.tkestack.io/v1beta1
/// kind: BackendGroup
/// metadata:
///   name: web-svc-backends
///   namespace: kube-system
/// spec:
///   lbName: a-lb
///   pods:
///     port:
///       portNumber: 80
///       protocol: TCP
///     byName:
///       - web-0
///       - web-1
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "lbcf.tkestack.io",
    version = "v1beta1",
    kind = "BackendGroup",
    plural = "backendgroups",
    shortname = "bg",
    namespaced,
    printcolumn = r#"{"name":"LoadBalancer", "type":"string", "jsonPath":".spec.lbName"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BackendGroupSpec {
    /// Name of the LoadBalancer the backends are registered to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lb_name: Option<String>,

    /// Select backends as the nodes behind a Service's NodePort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceBackend>,

    /// Select Pods as backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods: Option<PodBackend>,

    /// Static backend addresses.
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub static_backends: Option<Vec<String>>,

    /// Driver-specific parameters passed along with each backend.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl BackendGroupSpec {
    /// The backend selection strategy this spec uses
    pub fn strategy(&self) -> BackendStrategy {
        resolve_strategy(self)
    }
}

/// Backends are the nodes exposing a Service port.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBackend {
    /// Service name, in the BackendGroup's namespace.
    pub name: String,

    /// Service port to expose.
    pub port: PortSelector,

    /// Only nodes matching these labels are registered.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
}

/// Backends are Pods, selected by label or by name.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PodBackend {
    /// Container port to register.
    pub port: PortSelector,

    /// Select Pods by label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_label: Option<SelectPodByLabel>,

    /// Select Pods by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_name: Option<Vec<String>>,
}

/// Label-based Pod selection.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectPodByLabel {
    /// Labels a Pod must carry.
    #[serde(default)]
    pub selector: BTreeMap<String, String>,

    /// Names of Pods to exclude even if they match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
}

/// A port number with an optional protocol.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortSelector {
    /// Port number, 1-65535.
    pub port_number: i32,

    /// `TCP` or `UDP`, case-insensitive. Defaults to TCP when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl PortSelector {
    /// Create a port selector without a protocol
    pub fn new(port_number: i32) -> Self {
        Self {
            port_number,
            protocol: None,
        }
    }

    /// Set the protocol
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }
}

/// Which backend selection strategy a BackendGroup uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendStrategy {
    Service,
    Pods,
    Static,
    /// None of the strategies is set
    #[default]
    Unset,
}

impl fmt::Display for BackendStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendStrategy::Service => "service",
            BackendStrategy::Pods => "pods",
            BackendStrategy::Static => "static",
            BackendStrategy::Unset => "unset",
        };
        write!(f, "{}", s)
    }
}

/// Classify the backend selection strategy of a spec.
///
/// Precedence is service, then pods, then a non-empty static list. An empty
/// static list counts as unset.
pub fn resolve_strategy(spec: &BackendGroupSpec) -> BackendStrategy {
    if spec.service.is_some() {
        BackendStrategy::Service
    } else if spec.pods.is_some() {
        BackendStrategy::Pods
    } else if spec.static_backends.as_ref().is_some_and(|s| !s.is_empty()) {
        BackendStrategy::Static
    } else {
        BackendStrategy::Unset
    }
}
