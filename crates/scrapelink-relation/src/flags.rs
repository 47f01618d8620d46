//! Readiness flags for relation endpoints.
//!
//! Flag names follow the `<endpoint>.<condition>` grammar: `connected`
//! (a peer joined), `available` (a joined peer published data), and
//! `exposed.<job>` (a given scrape job is currently published). The
//! [`FlagSet`] holds the active names; the typed view over the
//! connected/available pair is [`EndpointState`](crate::EndpointState).

use std::collections::BTreeSet;

use tracing::debug;

/// Flag name for "a peer has joined the endpoint".
pub fn connected(endpoint: &str) -> String {
    format!("{endpoint}.connected")
}

/// Flag name for "a joined peer has published data".
pub fn available(endpoint: &str) -> String {
    format!("{endpoint}.available")
}

/// Flag name for "the named job is currently exposed on the endpoint".
pub fn exposed(endpoint: &str, job_name: &str) -> String {
    format!("{endpoint}.exposed.{job_name}")
}

/// Ordered set of active readiness flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: BTreeSet<String>,
}

impl FlagSet {
    /// Create an empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a flag. Raising an already-set flag is a no-op.
    pub fn set(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.flags.contains(&name) {
            return;
        }
        debug!(flag = %name, "flag set");
        self.flags.insert(name);
    }

    /// Clear a flag, returning whether it was set. Clearing an absent
    /// flag is a no-op, never an error.
    pub fn clear(&mut self, name: &str) -> bool {
        let was_set = self.flags.remove(name);
        if was_set {
            debug!(flag = %name, "flag cleared");
        }
        was_set
    }

    /// Whether the named flag is currently set.
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Iterate the active flag names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    /// Number of active flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no flag is set.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
