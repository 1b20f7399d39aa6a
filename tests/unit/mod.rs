// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for lbcf-admission.
//!
//! These tests run without a Kubernetes cluster and exercise the public
//! validation API the way an admission gate would.

#[path = "../common/mod.rs"]
mod common;

mod driver_tests {
    use super::common::fixtures::DriverBuilder;
    use lbcf_admission::validation::{
        DriverValidator, ErrorType, FieldPath, WebhookRegistry, driver_update_allowed,
        validate_driver,
    };

    #[test]
    fn test_fully_configured_driver_is_valid() {
        let driver = DriverBuilder::new("lbcf-clb")
            .namespace("kube-system")
            .webhook("validateLoadBalancer", Some("10s"))
            .webhook("ensureLoadBalancer", Some("1m"))
            .webhook("deleteLoadBalancer", None)
            .build();
        assert!(validate_driver(&driver).is_empty());
    }

    #[test]
    fn test_reserved_prefix_outside_system_namespace() {
        let driver = DriverBuilder::new("lbcf-mine").namespace("team-a").build();
        let errs = validate_driver(&driver);
        let err = errs
            .of_type(ErrorType::Invalid)
            .find(|e| e.field.to_string() == "metadata.name");
        assert!(err.is_some(), "expected metadata.name violation: {}", errs);
    }

    #[test]
    fn test_all_violations_reported_together() {
        let driver = DriverBuilder::new("clb")
            .namespace("kube-system")
            .driver_type("Grpc")
            .webhook("ensureLoadBalancer", Some("90s"))
            .webhook("ensureLoadBalancer", None)
            .webhook("reboot", None)
            .build();

        let errs = validate_driver(&driver);
        let summary: Vec<(ErrorType, String)> = errs
            .iter()
            .map(|e| (e.error_type, e.field.to_string()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ErrorType::Invalid, "metadata.name".to_string()),
                (ErrorType::Invalid, "spec.driverType".to_string()),
                (ErrorType::Invalid, "spec.webhooks[0].timeout".to_string()),
                (ErrorType::Duplicate, "spec.webhooks[1].name".to_string()),
                (ErrorType::NotSupported, "spec.webhooks[2].name".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_with_bad_timeout_reported_once() {
        let driver = DriverBuilder::new("my-driver")
            .webhook("validateBackend", None)
            .webhook("validateBackend", Some("10m"))
            .build();
        let errs = validate_driver(&driver);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.of_type(ErrorType::Duplicate).count(), 1);
    }

    #[test]
    fn test_registry_is_swappable() {
        let registry = WebhookRegistry::new(["onlyThisOne"]);
        let validator = DriverValidator::new(&registry);
        let driver = DriverBuilder::new("my-driver")
            .webhook("onlyThisOne", None)
            .build();
        assert!(validator.validate(&driver).is_empty());

        let webhooks = driver.spec.webhooks.unwrap();
        assert!(
            validator
                .validate_webhooks(&webhooks, &FieldPath::new("spec"))
                .is_empty()
        );
    }

    #[test]
    fn test_update_rules() {
        let old = DriverBuilder::new("my-driver").build();

        let webhooks_changed = DriverBuilder::new("my-driver")
            .webhook("ensureLoadBalancer", Some("5s"))
            .build();
        assert!(driver_update_allowed(&webhooks_changed, &old));

        let url_changed = DriverBuilder::new("my-driver")
            .url("http://elsewhere.svc")
            .build();
        assert!(!driver_update_allowed(&url_changed, &old));
    }
}

mod load_balancer_tests {
    use super::common::fixtures::LoadBalancerBuilder;
    use lbcf_admission::validation::lb_update_allowed;

    #[test]
    fn test_only_lb_spec_differs() {
        let old = LoadBalancerBuilder::new("a-lb")
            .lb_spec("vpcID", "vpc-1")
            .build();
        let new = LoadBalancerBuilder::new("a-lb")
            .lb_spec("vpcID", "vpc-1")
            .lb_spec("subnetID", "subnet-1")
            .build();
        assert!(!lb_update_allowed(&new, &old));
    }

    #[test]
    fn test_attribute_change_allowed() {
        let old = LoadBalancerBuilder::new("a-lb")
            .lb_spec("vpcID", "vpc-1")
            .build();
        let new = LoadBalancerBuilder::new("a-lb")
            .lb_spec("vpcID", "vpc-1")
            .attribute("idleTimeout", "30")
            .build();
        assert!(lb_update_allowed(&new, &old));
    }
}

mod backend_group_tests {
    use super::common::fixtures::BackendGroupBuilder;
    use lbcf_admission::crd::{BackendStrategy, PortSelector, resolve_strategy};
    use lbcf_admission::validation::{
        ErrorType, backend_group_update_allowed, validate_backend_group,
    };

    #[test]
    fn test_each_strategy_valid_alone() {
        let groups = [
            BackendGroupBuilder::new("svc")
                .service("web", PortSelector::new(80).with_protocol("tcp"))
                .build(),
            BackendGroupBuilder::new("pods")
                .pods_by_name(PortSelector::new(8080), &["web-0", "web-1"])
                .build(),
            BackendGroupBuilder::new("static")
                .static_backends(&["10.0.0.1:80"])
                .build(),
        ];
        for group in &groups {
            let errs = validate_backend_group(group);
            assert!(errs.is_empty(), "{:?}: {}", group.metadata.name, errs);
        }
    }

    #[test]
    fn test_two_strategies_conflict() {
        let group = BackendGroupBuilder::new("mixed")
            .pods_by_name(PortSelector::new(80), &["web-0"])
            .static_backends(&["10.0.0.1:80"])
            .build();
        let errs = validate_backend_group(&group);
        assert_eq!(errs.len(), 1);
        let err = errs.iter().next().unwrap();
        assert_eq!(err.error_type, ErrorType::Invalid);
        assert!(err.detail.contains("only one of"));
    }

    #[test]
    fn test_empty_static_rejected() {
        let group = BackendGroupBuilder::new("empty").static_backends(&[]).build();
        let errs = validate_backend_group(&group);
        assert_eq!(errs.of_type(ErrorType::Required).count(), 1);
    }

    #[test]
    fn test_by_label_only_flags_by_name_required() {
        let group = BackendGroupBuilder::new("labelled")
            .pods_by_label(PortSelector::new(80), "web")
            .build();
        let errs = validate_backend_group(&group);
        assert_eq!(errs.len(), 1);
        let err = errs.iter().next().unwrap();
        assert_eq!(err.error_type, ErrorType::Required);
        assert_eq!(err.field.to_string(), "spec.pods.byLabel/byName");
    }

    #[test]
    fn test_port_and_protocol_both_reported() {
        let group = BackendGroupBuilder::new("bad-port")
            .pods_by_name(PortSelector::new(65536).with_protocol("sctp"), &["web-0"])
            .build();
        let fields: Vec<String> = validate_backend_group(&group)
            .iter()
            .map(|e| e.field.to_string())
            .collect();
        assert_eq!(
            fields,
            vec!["spec.pods.port.portNumber", "spec.pods.port.protocol"]
        );
    }

    #[test]
    fn test_update_keeps_strategy() {
        let old = BackendGroupBuilder::new("web")
            .service("web", PortSelector::new(80))
            .build();
        let port_changed = BackendGroupBuilder::new("web")
            .service("web", PortSelector::new(443))
            .build();
        assert!(backend_group_update_allowed(&port_changed, &old));

        let switched = BackendGroupBuilder::new("web")
            .pods_by_name(PortSelector::new(80), &["web-0"])
            .build();
        assert_eq!(resolve_strategy(&switched.spec), BackendStrategy::Pods);
        assert!(!backend_group_update_allowed(&switched, &old));
    }
}

mod lister_tests {
    use super::common::fixtures::{DriverBuilder, LoadBalancerBuilder};
    use lbcf_admission::crd::LoadBalancerDriver;
    use lbcf_admission::lister::{InMemoryLister, LabelSelector, ResourceLister};
    use lbcf_admission::webhooks::ValidationContext;
    use lbcf_admission::webhooks::policies::load_balancer;

    #[test]
    fn test_driver_lookup_drives_lb_admission() {
        let drivers: InMemoryLister<LoadBalancerDriver> = InMemoryLister::new([
            DriverBuilder::new("lbcf-clb").namespace("kube-system").build(),
        ]);
        assert_eq!(
            drivers
                .list(None, &LabelSelector::everything())
                .unwrap()
                .len(),
            1
        );

        let lb = LoadBalancerBuilder::new("a-lb")
            .namespace("team-a")
            .driver("lbcf-clb")
            .build();
        let ctx = ValidationContext {
            resource: &lb,
            old_resource: None,
            dry_run: true,
            namespace: Some("team-a"),
        };
        assert!(load_balancer::validate(&ctx, &drivers).allowed);

        let lb = LoadBalancerBuilder::new("b-lb")
            .namespace("team-a")
            .driver("lbcf-missing")
            .build();
        let ctx = ValidationContext {
            resource: &lb,
            old_resource: None,
            dry_run: false,
            namespace: Some("team-a"),
        };
        let result = load_balancer::validate(&ctx, &drivers);
        assert!(!result.allowed);
        assert_eq!(result.reason.as_deref(), Some("DriverNotFound"));
    }
}
