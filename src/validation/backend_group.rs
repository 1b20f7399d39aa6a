//! BackendGroup validation.
//!
//! Validates:
//! - Exactly one of `service`, `pods`, `static` is set, and `static` is non-empty if chosen
//! - Port selectors name a port in 1-65535 and, optionally, TCP or UDP
//! - Pod backends select by label or by name
//!
//! Updates may not switch the backend selection strategy.

use kube::ResourceExt;
use tracing::debug;

use super::field::{ErrorList, FieldError, FieldPath};
use crate::crd::{
    BackendGroup, BackendGroupSpec, PodBackend, PortSelector, ServiceBackend, resolve_strategy,
};

const ONLY_ONE_BACKEND: &str = "only one of \"service, pods, static\" is allowed";

/// Highest valid port number
pub const MAX_PORT: i32 = 65535;

/// Validate a backend group on create
pub fn validate_backend_group(group: &BackendGroup) -> ErrorList {
    let errs = validate_backends(&group.spec, &FieldPath::new("spec"));
    debug!(
        name = %group.name_any(),
        strategy = %resolve_strategy(&group.spec),
        errors = errs.len(),
        "Validated BackendGroup"
    );
    errs
}

/// Validate the backend selection of a spec rooted at `path`.
///
/// A conflict between strategies is reported instead of validating the
/// chosen strategy.
pub fn validate_backends(spec: &BackendGroupSpec, path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();

    if let Some(service) = &spec.service {
        if let Some(pods) = &spec.pods {
            errs.push(FieldError::invalid(
                path.child("pods"),
                to_value(pods),
                ONLY_ONE_BACKEND,
            ));
        } else if let Some(static_backends) = &spec.static_backends {
            errs.push(FieldError::invalid(
                path.child("static"),
                to_value(static_backends),
                ONLY_ONE_BACKEND,
            ));
        } else {
            errs.merge(validate_service_backend(service, &path.child("service")));
        }
        return errs;
    }

    if let Some(pods) = &spec.pods {
        if let Some(static_backends) = &spec.static_backends {
            errs.push(FieldError::invalid(
                path.child("static"),
                to_value(static_backends),
                ONLY_ONE_BACKEND,
            ));
        } else {
            errs.merge(validate_pod_backend(pods, &path.child("pods")));
        }
        return errs;
    }

    if spec.static_backends.as_ref().is_none_or(Vec::is_empty) {
        errs.push(FieldError::required(
            path.child("service/pods/static"),
            "one of \"service, pods, static\" must be specified. if static is specified, it must not be empty array",
        ));
    }
    errs
}

fn validate_service_backend(service: &ServiceBackend, path: &FieldPath) -> ErrorList {
    validate_port_selector(&service.port, &path.child("port"))
}

// A byLabel-only pod backend is reported as missing byName.
fn validate_pod_backend(pods: &PodBackend, path: &FieldPath) -> ErrorList {
    let mut errs = validate_port_selector(&pods.port, &path.child("port"));

    if pods.by_label.is_some() {
        if let Some(by_name) = &pods.by_name {
            errs.push(FieldError::invalid(
                path.child("byName"),
                to_value(by_name),
                "only one of \"byLabel, byName\" is allowed",
            ));
        }
    }

    if pods.by_name.is_none() {
        errs.push(FieldError::required(
            path.child("byLabel/byName"),
            "one of \"byLabel, byName\" must be specified",
        ));
    }
    errs
}

/// Validate a port selector rooted at `path`
pub fn validate_port_selector(port: &PortSelector, path: &FieldPath) -> ErrorList {
    let mut errs = ErrorList::new();

    if port.port_number <= 0 || port.port_number > MAX_PORT {
        errs.push(FieldError::invalid(
            path.child("portNumber"),
            port.port_number,
            "portNumber must be greater than 0 and less than 65536",
        ));
    }

    if let Some(protocol) = &port.protocol {
        let upper = protocol.to_uppercase();
        if upper != "TCP" && upper != "UDP" {
            errs.push(FieldError::invalid(
                path.child("protocol"),
                protocol.as_str(),
                "protocol must be \"TCP\" or \"UDP\"",
            ));
        }
    }
    errs
}

/// Whether an update keeps the backend selection strategy
pub fn backend_group_update_allowed(cur: &BackendGroup, old: &BackendGroup) -> bool {
    resolve_strategy(&cur.spec) == resolve_strategy(&old.spec)
}

fn to_value<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_default()
}
