//! Key deriver trait and the built-in derivers.

use super::{DEFAULT_NAMESPACE, LockKey};
use serde_json::Value;

/// Maps a job identity to the key of the lock guarding it.
///
/// Implementations must be deterministic: equal `(job_type, args)` pairs
/// always produce the same key.
pub trait KeyDeriver: Send + Sync {
    fn derive_key(&self, job_type: &str, args: &[Value]) -> LockKey;
}

impl<F> KeyDeriver for F
where
    F: Fn(&str, &[Value]) -> LockKey + Send + Sync,
{
    fn derive_key(&self, job_type: &str, args: &[Value]) -> LockKey {
        self(job_type, args)
    }
}

/// Render an argument list as a compact JSON array.
///
/// Object keys come out sorted (serde_json's default map is ordered), so
/// structurally equal arguments always render identically.
pub fn render_args(args: &[Value]) -> String {
    let mut rendered = String::from("[");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            rendered.push(',');
        }
        rendered.push_str(&arg.to_string());
    }
    rendered.push(']');
    rendered
}

/// `namespace + job_type + "-" + render_args(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultKeyDeriver {
    namespace: String,
}

impl DefaultKeyDeriver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Default for DefaultKeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl KeyDeriver for DefaultKeyDeriver {
    fn derive_key(&self, job_type: &str, args: &[Value]) -> LockKey {
        LockKey::new(format!(
            "{}{}-{}",
            self.namespace,
            job_type,
            render_args(args)
        ))
    }
}

/// Locks on a fixed key, ignoring the arguments entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantKey {
    key: LockKey,
}

impl ConstantKey {
    pub fn new(key: impl Into<LockKey>) -> Self {
        Self { key: key.into() }
    }
}

impl KeyDeriver for ConstantKey {
    fn derive_key(&self, _job_type: &str, _args: &[Value]) -> LockKey {
        self.key.clone()
    }
}

/// Locks on a subset of the arguments, picked by position.
///
/// Positions past the end of the argument list render as `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSubsetKey {
    namespace: String,
    positions: Vec<usize>,
}

impl ArgSubsetKey {
    pub fn new(namespace: impl Into<String>, positions: impl IntoIterator<Item = usize>) -> Self {
        Self {
            namespace: namespace.into(),
            positions: positions.into_iter().collect(),
        }
    }
}

impl KeyDeriver for ArgSubsetKey {
    fn derive_key(&self, job_type: &str, args: &[Value]) -> LockKey {
        let picked: Vec<Value> = self
            .positions
            .iter()
            .map(|&i| args.get(i).cloned().unwrap_or(Value::Null))
            .collect();
        DefaultKeyDeriver::new(self.namespace.as_str()).derive_key(job_type, &picked)
    }
}
