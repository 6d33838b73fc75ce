//! Per-job-type deriver overrides.

use super::deriver::{DefaultKeyDeriver, KeyDeriver};
use super::{DEFAULT_NAMESPACE, LockKey};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Picks the deriver for a job type: a registered override if there is one,
/// the namespace's default deriver otherwise.
#[derive(Clone)]
pub struct DeriverRegistry {
    default: DefaultKeyDeriver,
    overrides: BTreeMap<String, Arc<dyn KeyDeriver>>,
}

impl DeriverRegistry {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            default: DefaultKeyDeriver::new(namespace),
            overrides: BTreeMap::new(),
        }
    }

    /// Namespace of the default deriver; also the prefix used for listing.
    pub fn namespace(&self) -> &str {
        self.default.namespace()
    }

    /// Register (or replace) the deriver for one job type.
    pub fn register(&mut self, job_type: impl Into<String>, deriver: impl KeyDeriver + 'static) {
        self.overrides.insert(job_type.into(), Arc::new(deriver));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_override(
        mut self,
        job_type: impl Into<String>,
        deriver: impl KeyDeriver + 'static,
    ) -> Self {
        self.register(job_type, deriver);
        self
    }

    pub fn has_override(&self, job_type: &str) -> bool {
        self.overrides.contains_key(job_type)
    }

    /// A key inside this registry's namespace, for building constant keys
    /// that still show up in lock listings.
    pub fn namespaced(&self, name: &str) -> LockKey {
        LockKey::new(format!("{}{}", self.namespace(), name))
    }
}

impl Default for DeriverRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl KeyDeriver for DeriverRegistry {
    fn derive_key(&self, job_type: &str, args: &[Value]) -> LockKey {
        match self.overrides.get(job_type) {
            Some(deriver) => deriver.derive_key(job_type, args),
            None => self.default.derive_key(job_type, args),
        }
    }
}

impl fmt::Debug for DeriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overridden: Vec<&str> = self.overrides.keys().map(String::as_str).collect();
        f.debug_struct("DeriverRegistry")
            .field("namespace", &self.namespace())
            .field("overrides", &overridden)
            .finish()
    }
}
