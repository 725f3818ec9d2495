//! Immutable launch environment for simulation subprocesses.
//!
//! The parent process environment is never modified. A [`LaunchEnv`] is a
//! snapshot taken once, with logging variables scrubbed, and each override
//! produces a new value.

use std::collections::BTreeMap;

/// Variables with this prefix switch on simulation-side dumps and are removed
/// before timing runs.
pub const DEFAULT_SCRUB_PREFIX: &str = "LULESH_LOG_";

/// OpenMP thread count variable set for the reference side.
pub const THREADS_VAR: &str = "OMP_NUM_THREADS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchEnv {
    vars: BTreeMap<String, String>,
}

impl LaunchEnv {
    /// Snapshot `vars`, dropping every name that starts with a scrub prefix.
    pub fn from_vars<I, K, V, P>(vars: I, scrub_prefixes: &[P]) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        P: AsRef<str>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !scrub_prefixes.iter().any(|p| k.starts_with(p.as_ref())))
            .collect();
        Self { vars }
    }

    /// Snapshot of the current process environment.
    pub fn from_process<P: AsRef<str>>(scrub_prefixes: &[P]) -> Self {
        Self::from_vars(std::env::vars(), scrub_prefixes)
    }

    #[must_use]
    pub fn with_var(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut vars = self.vars.clone();
        vars.insert(key.into(), value.into());
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
