//! Custom Resource Definitions (CRDs) for the load balancer controlling framework.
//!
//! - `LoadBalancerDriver`: registers a webhook server that drives a load balancer
//! - `LoadBalancer`: a load balancer instance managed through a driver
//! - `BackendGroup`: the set of backends registered to a load balancer

mod backend_group;
mod load_balancer;
mod load_balancer_driver;

pub use backend_group::*;
pub use load_balancer::*;
pub use load_balancer_driver::*;

/// Namespace reserved for system drivers
pub const SYSTEM_NAMESPACE: &str = "kube-system";

/// Name prefix reserved for drivers in [`SYSTEM_NAMESPACE`]
pub const SYSTEM_DRIVER_PREFIX: &str = "lbcf-";

/// Namespace a driver named `driver_name` is looked up in, relative to the
/// namespace of the resource referencing it.
///
/// System drivers always live in `kube-system`; any other driver must sit in
/// the same namespace as its referrer.
pub fn driver_namespace<'a>(driver_name: &str, referrer_namespace: &'a str) -> &'a str {
    if driver_name.starts_with(SYSTEM_DRIVER_PREFIX) {
        SYSTEM_NAMESPACE
    } else {
        referrer_namespace
    }
}
