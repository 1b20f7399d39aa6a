//! LoadBalancer update policy.
//!
//! A load balancer's driver and driver-specific spec are fixed at creation;
//! only attributes and the ensure policy may change afterwards.

use kube::ResourceExt;

use crate::crd::LoadBalancer;

/// Whether an update keeps the load balancer's immutable fields
pub fn lb_update_allowed(cur: &LoadBalancer, old: &LoadBalancer) -> bool {
    cur.name_any() == old.name_any()
        && cur.spec.lb_driver == old.spec.lb_driver
        && cur.spec.lb_spec == old.spec.lb_spec
}
