//! Network binding lookup.
//!
//! Which address a unit advertises on a relation's network binding is
//! the embedding platform's call; this module defines the seam and a
//! fixed-table implementation for hosts that resolve bindings up front.

use std::collections::BTreeMap;

/// Resolves the ingress address a unit advertises for a relation endpoint.
pub trait NetworkBinding {
    /// Address to advertise on `endpoint`'s network binding, or `None`
    /// when the binding is unknown.
    fn ingress_address(&self, endpoint: &str) -> Option<String>;
}

/// Fixed binding table: one default address plus per-endpoint overrides.
#[derive(Debug, Clone, Default)]
pub struct StaticBinding {
    default: Option<String>,
    overrides: BTreeMap<String, String>,
}

impl StaticBinding {
    /// Table answering `address` for every endpoint.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            default: Some(address.into()),
            overrides: BTreeMap::new(),
        }
    }

    /// Table with no default; only explicitly pinned endpoints resolve.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pin an endpoint to a specific address.
    pub fn with_endpoint(
        mut self,
        endpoint: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.overrides.insert(endpoint.into(), address.into());
        self
    }
}

impl NetworkBinding for StaticBinding {
    fn ingress_address(&self, endpoint: &str) -> Option<String> {
        self.overrides
            .get(endpoint)
            .cloned()
            .or_else(|| self.default.clone())
    }
}
