//! Relation lifecycle events and the per-endpoint state machine.
//!
//! The embedding host delivers one [`RelationEvent`] per lifecycle hook;
//! [`EndpointState`] folds those events into the connection state of a
//! relation endpoint. Events that make no sense for the current state
//! (a `Changed` with no peer joined) leave the state untouched.

/// Lifecycle event for a relation endpoint, delivered by the embedding host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationEvent {
    /// A peer joined the relation.
    Joined,
    /// A joined peer published or updated its relation data.
    Changed,
    /// The joined condition no longer holds: the last peer left.
    Departed,
}

/// Connection state of a relation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointState {
    /// No peer present.
    #[default]
    Idle,
    /// At least one peer has joined; no peer data seen yet.
    Connected,
    /// A joined peer has published data.
    Available,
}

impl EndpointState {
    /// Apply a lifecycle event, returning the next state.
    #[must_use]
    pub fn apply(self, event: RelationEvent) -> EndpointState {
        match (self, event) {
            (EndpointState::Idle, RelationEvent::Joined) => EndpointState::Connected,
            (EndpointState::Connected, RelationEvent::Changed) => EndpointState::Available,
            (_, RelationEvent::Departed) => EndpointState::Idle,
            (state, _) => state,
        }
    }

    /// True once a peer has joined (`Connected` or `Available`).
    pub fn is_connected(self) -> bool {
        !matches!(self, EndpointState::Idle)
    }

    /// True once a joined peer has published data.
    pub fn is_available(self) -> bool {
        matches!(self, EndpointState::Available)
    }
}
