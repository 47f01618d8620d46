//! Per-endpoint relation registry and event handling.
//!
//! [`Endpoint`] folds host-delivered lifecycle events into the endpoint
//! state machine, keeps the readiness flags in step with it, and owns
//! the handles of the currently joined relations.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::flags::{self, FlagSet};
use crate::lifecycle::{EndpointState, RelationEvent};
use crate::relation::{RelationHandle, RelationId};

/// One relation endpoint: state machine, flags, and live relations.
#[derive(Debug, Clone)]
pub struct Endpoint {
    name: String,
    state: EndpointState,
    flags: FlagSet,
    relations: BTreeMap<RelationId, RelationHandle>,
}

impl Endpoint {
    /// Create an idle endpoint with no relations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: EndpointState::Idle,
            flags: FlagSet::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Endpoint name; also the prefix of its flag names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current connection state.
    pub fn state(&self) -> EndpointState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    /// Apply a lifecycle event: advance the state machine and keep the
    /// `connected`/`available` flags in step with it.
    ///
    /// `Departed` clears both flags whether or not they were set.
    pub fn handle_event(&mut self, event: RelationEvent) {
        let next = self.state.apply(event);
        if next != self.state {
            info!(
                endpoint = %self.name,
                ?event,
                from = ?self.state,
                to = ?next,
                "endpoint state changed"
            );
        }
        self.state = next;

        match event {
            RelationEvent::Joined => {
                self.flags.set(flags::connected(&self.name));
            }
            RelationEvent::Changed => {
                if self.state.is_available() {
                    self.flags.set(flags::available(&self.name));
                }
            }
            RelationEvent::Departed => {
                self.flags.clear(&flags::connected(&self.name));
                self.flags.clear(&flags::available(&self.name));
            }
        }
    }

    /// Register a relation handle, replacing any handle with the same id.
    pub fn insert_relation(&mut self, relation: RelationHandle) {
        debug!(endpoint = %self.name, relation = %relation.id(), "relation attached");
        self.relations.insert(relation.id().clone(), relation);
    }

    /// Remove a relation handle, returning it if it was present.
    pub fn remove_relation(&mut self, id: &RelationId) -> Option<RelationHandle> {
        let removed = self.relations.remove(id);
        if removed.is_some() {
            debug!(endpoint = %self.name, relation = %id, "relation detached");
        }
        removed
    }

    /// Look up a relation by id.
    pub fn relation(&self, id: &RelationId) -> Option<&RelationHandle> {
        self.relations.get(id)
    }

    /// Look up a relation mutably. Hosts use this to maintain handle
    /// stores outside the publish path.
    pub fn relation_mut(&mut self, id: &RelationId) -> Option<&mut RelationHandle> {
        self.relations.get_mut(id)
    }

    /// Iterate the current relations in id order.
    pub fn relations(&self) -> impl Iterator<Item = &RelationHandle> {
        self.relations.values()
    }

    /// Iterate the current relations mutably, in id order.
    pub fn relations_mut(&mut self) -> impl Iterator<Item = &mut RelationHandle> {
        self.relations.values_mut()
    }

    /// Number of current relations.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// The readiness flags raised on this endpoint.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Mutable access to the flag set, for interface layers that raise
    /// flags of their own (such as `exposed.<job>`).
    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    /// Active flag names in sorted order.
    pub fn active_flags(&self) -> Vec<String> {
        self.flags.iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new("metrics-endpoint")
    }

    #[test]
    fn joined_sets_state_and_flag() {
        let mut ep = endpoint();
        ep.handle_event(RelationEvent::Joined);

        assert_eq!(ep.state(), EndpointState::Connected);
        assert!(ep.flags().is_set("metrics-endpoint.connected"));
        assert!(!ep.flags().is_set("metrics-endpoint.available"));
    }

    #[test]
    fn changed_after_joined_sets_available() {
        let mut ep = endpoint();
        ep.handle_event(RelationEvent::Joined);
        ep.handle_event(RelationEvent::Changed);

        assert_eq!(ep.state(), EndpointState::Available);
        assert!(ep.is_available());
        assert_eq!(
            ep.active_flags(),
            vec!["metrics-endpoint.available", "metrics-endpoint.connected"]
        );
    }

    #[test]
    fn changed_while_idle_raises_nothing() {
        let mut ep = endpoint();
        ep.handle_event(RelationEvent::Changed);

        assert_eq!(ep.state(), EndpointState::Idle);
        assert!(ep.flags().is_empty());
    }

    #[test]
    fn departed_clears_both_flags() {
        let mut ep = endpoint();
        ep.handle_event(RelationEvent::Joined);
        ep.handle_event(RelationEvent::Changed);
        ep.handle_event(RelationEvent::Departed);

        assert_eq!(ep.state(), EndpointState::Idle);
        assert!(ep.flags().is_empty());
    }

    #[test]
    fn departed_is_idempotent() {
        let mut ep = endpoint();
        ep.handle_event(RelationEvent::Departed);
        ep.handle_event(RelationEvent::Departed);

        assert_eq!(ep.state(), EndpointState::Idle);
        assert!(ep.flags().is_empty());
    }

    #[test]
    fn departed_leaves_foreign_flags_alone() {
        let mut ep = endpoint();
        ep.flags_mut().set("metrics-endpoint.exposed.somename");
        ep.handle_event(RelationEvent::Joined);
        ep.handle_event(RelationEvent::Departed);

        assert_eq!(ep.active_flags(), vec!["metrics-endpoint.exposed.somename"]);
    }

    #[test]
    fn relations_insert_lookup_remove() {
        let mut ep = endpoint();
        let id = RelationId::new("metrics-endpoint", 19);
        ep.insert_relation(RelationHandle::new(id.clone()));

        assert_eq!(ep.relation_count(), 1);
        assert!(ep.relation(&id).is_some());

        let removed = ep.remove_relation(&id).unwrap();
        assert_eq!(removed.id(), &id);
        assert_eq!(ep.relation_count(), 0);
        assert!(ep.remove_relation(&id).is_none());
    }

    #[test]
    fn relations_iterate_in_id_order() {
        let mut ep = endpoint();
        for number in [23, 7, 19] {
            ep.insert_relation(RelationHandle::new(RelationId::new(
                "metrics-endpoint",
                number,
            )));
        }

        let numbers: Vec<u32> = ep.relations().map(|r| r.id().number()).collect();
        assert_eq!(numbers, vec![7, 19, 23]);
    }

    #[test]
    fn relation_mut_edits_the_stored_handle() {
        let mut ep = endpoint();
        let id = RelationId::new("metrics-endpoint", 0);
        ep.insert_relation(RelationHandle::new(id.clone()));

        ep.relation_mut(&id)
            .unwrap()
            .unit_data_mut()
            .insert("k", "v");
        assert_eq!(ep.relation(&id).unwrap().unit_data().get("k"), Some("v"));
    }
}
