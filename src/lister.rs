//! Read-only lookups of LBCF resources.
//!
//! Admission decisions sometimes depend on other resources, e.g. a
//! LoadBalancer may only be created once its driver exists. [`ResourceLister`]
//! is the narrow view the webhook needs: list by namespace and labels, or get
//! one object by namespace and name. "Not found" and backend failures are
//! distinct outcomes.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kube::runtime::reflector::{ObjectRef, Store};
use kube::{Resource, ResourceExt};
use thiserror::Error;

/// Lookup failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListerError {
    /// No object with that key
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    /// The backing cache or API could not answer
    #[error("lookup failed: {0}")]
    Backend(String),
}

impl ListerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ListerError::NotFound { .. })
    }

    fn not_found<K: Resource<DynamicType = ()>>(namespace: &str, name: &str) -> Self {
        ListerError::NotFound {
            kind: K::kind(&()).to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

/// Equality-based label selector. An empty selector matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSelector {
    match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Selector matching every object
    pub fn everything() -> Self {
        Self::default()
    }

    /// Selector requiring all of `labels`
    pub fn from_labels(labels: BTreeMap<String, String>) -> Self {
        Self {
            match_labels: labels,
        }
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.match_labels
            .iter()
            .all(|(k, v)| labels.get(k) == Some(v))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .match_labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}", pairs.join(","))
    }
}

/// Read-only access to resources of kind `K`.
pub trait ResourceLister<K>: Send + Sync {
    /// Objects matching `selector`, in `namespace` or in all namespaces when `None`
    fn list(
        &self,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Arc<K>>, ListerError>;

    /// The object `namespace/name`
    fn get(&self, namespace: &str, name: &str) -> Result<Arc<K>, ListerError>;
}

fn in_scope<K: Resource>(obj: &K, namespace: Option<&str>, selector: &LabelSelector) -> bool {
    namespace.is_none_or(|ns| obj.namespace().as_deref() == Some(ns)) && selector.matches(obj.labels())
}

/// Lister backed by a reflector cache.
///
/// Every lookup fails with [`ListerError::Backend`] until the cache has
/// received its initial list; see [`StoreLister::wait_synced`].
pub struct StoreLister<K>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    store: Store<K>,
    synced: Arc<AtomicBool>,
}

impl<K> StoreLister<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    pub fn new(store: Store<K>) -> Self {
        Self {
            store,
            synced: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the initial list has been received
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Future resolving once the store's initial list has arrived, after
    /// which this lister answers lookups. Yields `false` if the store's
    /// writer was dropped first.
    pub fn wait_synced(&self) -> impl Future<Output = bool> + Send + 'static + use<K> {
        let store = self.store.clone();
        let synced = Arc::clone(&self.synced);
        async move {
            if store.wait_until_ready().await.is_err() {
                return false;
            }
            synced.store(true, Ordering::Release);
            true
        }
    }

    fn check_synced(&self) -> Result<(), ListerError> {
        if self.is_synced() {
            Ok(())
        } else {
            Err(ListerError::Backend(format!(
                "{} cache not synced",
                K::kind(&())
            )))
        }
    }
}

impl<K> ResourceLister<K> for StoreLister<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    fn list(
        &self,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Arc<K>>, ListerError> {
        self.check_synced()?;
        Ok(self
            .store
            .state()
            .into_iter()
            .filter(|obj| in_scope(obj.as_ref(), namespace, selector))
            .collect())
    }

    fn get(&self, namespace: &str, name: &str) -> Result<Arc<K>, ListerError> {
        self.check_synced()?;
        self.store
            .get(&ObjectRef::new(name).within(namespace))
            .ok_or_else(|| ListerError::not_found::<K>(namespace, name))
    }
}

/// Lister over a fixed set of objects.
pub struct InMemoryLister<K> {
    objects: Vec<Arc<K>>,
    backend_error: Option<String>,
}

impl<K> Default for InMemoryLister<K> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            backend_error: None,
        }
    }
}

impl<K> InMemoryLister<K>
where
    K: Resource<DynamicType = ()> + Send + Sync,
{
    pub fn new(objects: impl IntoIterator<Item = K>) -> Self {
        Self {
            objects: objects.into_iter().map(Arc::new).collect(),
            backend_error: None,
        }
    }

    /// A lister whose every lookup fails with a backend error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            objects: Vec::new(),
            backend_error: Some(message.into()),
        }
    }

    fn check_backend(&self) -> Result<(), ListerError> {
        match &self.backend_error {
            Some(msg) => Err(ListerError::Backend(msg.clone())),
            None => Ok(()),
        }
    }
}

impl<K> ResourceLister<K> for InMemoryLister<K>
where
    K: Resource<DynamicType = ()> + Send + Sync,
{
    fn list(
        &self,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> Result<Vec<Arc<K>>, ListerError> {
        self.check_backend()?;
        Ok(self
            .objects
            .iter()
            .filter(|obj| in_scope(obj.as_ref(), namespace, selector))
            .cloned()
            .collect())
    }

    fn get(&self, namespace: &str, name: &str) -> Result<Arc<K>, ListerError> {
        self.check_backend()?;
        self.objects
            .iter()
            .find(|obj| {
                obj.namespace().as_deref() == Some(namespace) && obj.name_any() == name
            })
            .cloned()
            .ok_or_else(|| ListerError::not_found::<K>(namespace, name))
    }
}
