//! Registry of the webhook names a driver may configure.

use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Webhooks every LBCF driver can implement.
pub const KNOWN_WEBHOOKS: [&str; 9] = [
    "validateLoadBalancer",
    "createLoadBalancer",
    "ensureLoadBalancer",
    "deleteLoadBalancer",
    "validateBackend",
    "generateBackendAddr",
    "ensureBackendRegistration",
    "deregisterBackend",
    "judgePodDeletion",
];

static KNOWN: LazyLock<WebhookRegistry> = LazyLock::new(WebhookRegistry::default);

/// Immutable set of recognised webhook names.
///
/// Built once and handed to validators by reference; tests build their own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookRegistry {
    names: BTreeSet<String>,
}

impl WebhookRegistry {
    /// Build a registry from an arbitrary set of names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The process-wide registry of [`KNOWN_WEBHOOKS`]
    pub fn known() -> &'static WebhookRegistry {
        &KNOWN
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for WebhookRegistry {
    fn default() -> Self {
        Self::new(KNOWN_WEBHOOKS)
    }
}
