//! Relation identity and per-relation data stores.
//!
//! A relation is one host-managed channel to a peer application. Each
//! relation carries two writable key/value stores: unit-scoped raw data
//! (plain strings) and application-scoped data (JSON-encoded values,
//! written only by the leader unit). Replicating the stores across
//! peers is the embedding platform's job, not this crate's.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{RelationError, RelationResult};

/// Convert any `Display` error into a `RelationError` variant.
macro_rules! map_err {
    ($variant:ident) => {
        |e| RelationError::$variant(e.to_string())
    };
}

/// Unique identifier of one relation, wire form `<endpoint>:<number>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId {
    endpoint: String,
    number: u32,
}

impl RelationId {
    pub fn new(endpoint: impl Into<String>, number: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            number,
        }
    }

    /// Endpoint name this relation belongs to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Relation number, unique within the host model.
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.endpoint, self.number)
    }
}

impl FromStr for RelationId {
    type Err = RelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (endpoint, number) = s
            .rsplit_once(':')
            .ok_or_else(|| RelationError::InvalidId(s.to_string()))?;
        if endpoint.is_empty() {
            return Err(RelationError::InvalidId(s.to_string()));
        }
        let number = number
            .parse()
            .map_err(|_| RelationError::InvalidId(s.to_string()))?;
        Ok(Self::new(endpoint, number))
    }
}

/// One relation-scoped key/value store.
///
/// Keys map to string values on the wire. `put_json`/`get_json` layer
/// typed records over the raw entries for application-scoped data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationData {
    entries: BTreeMap<String, String>,
}

impl RelationData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw string value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove a key if present, returning the previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Raw string value under a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// JSON-encode a record under the key, replacing any prior value.
    pub fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> RelationResult<()> {
        let encoded = serde_json::to_string(value).map_err(map_err!(Serialize))?;
        self.entries.insert(key.to_string(), encoded);
        Ok(())
    }

    /// Decode the JSON record under the key; `None` when the key is absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> RelationResult<Option<T>> {
        match self.entries.get(key) {
            Some(raw) => {
                let value = serde_json::from_str(raw).map_err(map_err!(Deserialize))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One live relation: identity plus its writable data stores.
///
/// Handles are created and destroyed by the embedding host as peers
/// join and depart; this crate only mutates the stores. Writing the
/// application-scoped store is reserved to the leader unit; callers
/// gate on leadership before touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationHandle {
    id: RelationId,
    unit: RelationData,
    app: RelationData,
}

impl RelationHandle {
    /// Create a fresh handle with empty stores.
    pub fn new(id: RelationId) -> Self {
        Self {
            id,
            unit: RelationData::new(),
            app: RelationData::new(),
        }
    }

    pub fn id(&self) -> &RelationId {
        &self.id
    }

    /// Unit-scoped raw data this unit publishes on the relation.
    pub fn unit_data(&self) -> &RelationData {
        &self.unit
    }

    pub fn unit_data_mut(&mut self) -> &mut RelationData {
        &mut self.unit
    }

    /// Application-scoped data (leader-writable).
    pub fn app_data(&self) -> &RelationData {
        &self.app
    }

    pub fn app_data_mut(&mut self) -> &mut RelationData {
        &mut self.app
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_id_parses_and_displays() {
        let id: RelationId = "metrics-endpoint:19".parse().unwrap();
        assert_eq!(id.endpoint(), "metrics-endpoint");
        assert_eq!(id.number(), 19);
        assert_eq!(id.to_string(), "metrics-endpoint:19");
    }

    #[test]
    fn relation_id_rejects_malformed_input() {
        for input in ["no-colon", "metrics-endpoint:x", ":19", ""] {
            let err = input.parse::<RelationId>().unwrap_err();
            assert!(matches!(err, RelationError::InvalidId(_)), "input {input:?}");
        }
    }

    #[test]
    fn relation_ids_order_by_endpoint_then_number() {
        let mut ids = vec![
            RelationId::new("b", 1),
            RelationId::new("a", 2),
            RelationId::new("a", 1),
        ];
        ids.sort();
        assert_eq!(
            ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["a:1", "a:2", "b:1"]
        );
    }

    #[test]
    fn raw_entries_round_trip() {
        let mut data = RelationData::new();
        data.insert("key", "value");

        assert!(data.contains("key"));
        assert_eq!(data.get("key"), Some("value"));
        assert_eq!(data.remove("key"), Some("value".to_string()));
        assert_eq!(data.remove("key"), None);
        assert!(data.is_empty());
    }

    #[test]
    fn json_entries_round_trip() {
        let mut data = RelationData::new();
        data.put_json("targets", &vec!["a:80".to_string(), "b:80".to_string()])
            .unwrap();

        assert_eq!(data.get("targets"), Some(r#"["a:80","b:80"]"#));
        let decoded: Vec<String> = data.get_json("targets").unwrap().unwrap();
        assert_eq!(decoded, vec!["a:80", "b:80"]);
    }

    #[test]
    fn get_json_absent_key_is_none() {
        let data = RelationData::new();
        let decoded: Option<Vec<String>> = data.get_json("missing").unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn get_json_malformed_value_is_an_error() {
        let mut data = RelationData::new();
        data.insert("bad", "not json");

        let err = data.get_json::<Vec<String>>("bad").unwrap_err();
        assert!(matches!(err, RelationError::Deserialize(_)));
    }

    #[test]
    fn handle_stores_are_independent() {
        let mut handle = RelationHandle::new(RelationId::new("metrics-endpoint", 0));
        handle.unit_data_mut().insert("k", "unit");
        handle.app_data_mut().insert("k", "app");

        assert_eq!(handle.unit_data().get("k"), Some("unit"));
        assert_eq!(handle.app_data().get("k"), Some("app"));
    }
}
