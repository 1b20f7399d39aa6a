// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for lbcf-admission.
//!
//! Uses proptest to generate random inputs and verify invariants.

use std::collections::BTreeMap;

use proptest::prelude::*;

use lbcf_admission::crd::{
    BackendGroupSpec, BackendStrategy, PodBackend, PortSelector, ServiceBackend, WebhookConfig,
    resolve_strategy,
};
use lbcf_admission::validation::{
    DriverValidator, ErrorType, FieldPath, KNOWN_WEBHOOKS, validate_backends,
    validate_port_selector,
};

/// Strategy for generating port numbers in the valid range.
fn valid_port() -> impl Strategy<Value = i32> {
    1..=65535i32
}

/// Strategy for generating port numbers outside the valid range.
fn invalid_port() -> impl Strategy<Value = i32> {
    prop_oneof![i32::MIN..=0i32, 65536..=i32::MAX]
}

/// Strategy for picking a known webhook name.
fn known_webhook() -> impl Strategy<Value = &'static str> {
    prop::sample::select(KNOWN_WEBHOOKS.to_vec())
}

/// Strategy for generating a backend group spec with any combination of strategies.
fn any_backends() -> impl Strategy<Value = BackendGroupSpec> {
    (
        any::<bool>(),
        any::<bool>(),
        prop::option::of(prop::collection::vec("[0-9.:]{1,12}", 0..3)),
    )
        .prop_map(|(service, pods, static_backends)| BackendGroupSpec {
            service: service.then(|| ServiceBackend {
                name: "web".to_string(),
                port: PortSelector::new(80),
                node_selector: BTreeMap::new(),
            }),
            pods: pods.then(|| PodBackend {
                port: PortSelector::new(80),
                by_label: None,
                by_name: Some(vec!["web-0".to_string()]),
            }),
            static_backends,
            ..Default::default()
        })
}

fn strategies_set(spec: &BackendGroupSpec) -> usize {
    [
        spec.service.is_some(),
        spec.pods.is_some(),
        spec.static_backends.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count()
}

proptest! {
    /// Property: Every port in 1-65535 is accepted.
    #[test]
    fn test_valid_port_accepted(port in valid_port()) {
        let errs = validate_port_selector(&PortSelector::new(port), &FieldPath::new("port"));
        prop_assert!(errs.is_empty(), "port {} rejected: {}", port, errs);
    }

    /// Property: Every port outside 1-65535 yields exactly one portNumber error.
    #[test]
    fn test_invalid_port_rejected(port in invalid_port()) {
        let errs = validate_port_selector(&PortSelector::new(port), &FieldPath::new("port"));
        prop_assert_eq!(errs.len(), 1);
        let err = errs.iter().next().unwrap();
        prop_assert_eq!(err.error_type, ErrorType::Invalid);
        prop_assert_eq!(err.field.to_string(), "port.portNumber");
    }

    /// Property: Protocol matching ignores case.
    #[test]
    fn test_protocol_case_insensitive(
        protocol in prop_oneof![Just("tcp"), Just("udp")],
        upper in any::<bool>()
    ) {
        let protocol = if upper { protocol.to_uppercase() } else { protocol.to_string() };
        let port = PortSelector::new(80).with_protocol(protocol);
        prop_assert!(validate_port_selector(&port, &FieldPath::new("port")).is_empty());
    }

    /// Property: Repeating a known webhook yields one duplicate per repeat and nothing else.
    #[test]
    fn test_repeated_webhook_reported_as_duplicate(
        name in known_webhook(),
        repeats in 1usize..5
    ) {
        let webhooks: Vec<WebhookConfig> =
            (0..=repeats).map(|_| WebhookConfig::new(name)).collect();
        let errs = DriverValidator::default()
            .validate_webhooks(&webhooks, &FieldPath::new("spec"));
        prop_assert_eq!(errs.len(), repeats);
        prop_assert_eq!(errs.of_type(ErrorType::Duplicate).count(), repeats);
        let first = errs.iter().next().unwrap();
        prop_assert_eq!(first.field.to_string(), "spec.webhooks[1].name");
    }

    /// Property: Names outside the registry are always unsupported.
    #[test]
    fn test_unknown_webhook_not_supported(name in "[a-z]{1,8}Unknown") {
        let errs = DriverValidator::default()
            .validate_webhooks(&[WebhookConfig::new(name)], &FieldPath::new("spec"));
        prop_assert_eq!(errs.of_type(ErrorType::NotSupported).count(), 1);
    }

    /// Property: Timeouts up to one minute are accepted, anything longer is rejected.
    #[test]
    fn test_timeout_bound(secs in 0i64..=120) {
        let webhook = WebhookConfig::new("ensureLoadBalancer").with_timeout(format!("{}s", secs));
        let errs = DriverValidator::default()
            .validate_webhooks(&[webhook], &FieldPath::new("spec"));
        prop_assert_eq!(errs.is_empty(), secs <= 60);
    }

    /// Property: Setting more than one strategy always reports a conflict.
    #[test]
    fn test_multiple_strategies_conflict(spec in any_backends()) {
        prop_assume!(strategies_set(&spec) > 1);
        let errs = validate_backends(&spec, &FieldPath::new("spec"));
        prop_assert_eq!(errs.len(), 1);
        prop_assert!(errs.iter().all(|e| e.detail.contains("only one of")));
    }

    /// Property: Strategy resolution is deterministic and follows precedence.
    #[test]
    fn test_strategy_resolution(spec in any_backends()) {
        let first = resolve_strategy(&spec);
        prop_assert_eq!(first, resolve_strategy(&spec));

        let expected = if spec.service.is_some() {
            BackendStrategy::Service
        } else if spec.pods.is_some() {
            BackendStrategy::Pods
        } else if spec.static_backends.as_ref().is_some_and(|s| !s.is_empty()) {
            BackendStrategy::Static
        } else {
            BackendStrategy::Unset
        };
        prop_assert_eq!(first, expected);
    }

    /// Property: A spec is valid exactly when it resolves to a single strategy.
    #[test]
    fn test_valid_iff_single_strategy(spec in any_backends()) {
        let errs = validate_backends(&spec, &FieldPath::new("spec"));
        let single = strategies_set(&spec) == 1 && resolve_strategy(&spec) != BackendStrategy::Unset;
        prop_assert_eq!(errs.is_empty(), single);
    }
}
