//! scrapelink-relation — relation-layer plumbing for scrapelink.
//!
//! Models one side of a host-managed peer relation: typed relation
//! identifiers, lifecycle events folded into a per-endpoint state
//! machine, readiness flags, and the unit-/application-scoped key/value
//! stores each relation carries.
//!
//! # Architecture
//!
//! The embedding host owns event delivery and relation-handle lifetime;
//! this crate owns the local bookkeeping. [`Endpoint`] folds
//! [`RelationEvent`]s into an [`EndpointState`] plus a [`FlagSet`], and
//! [`RelationHandle`] carries the writable stores whose replication is
//! the host's job. Unit-scoped values are plain strings;
//! application-scoped values are JSON-encoded strings written only by
//! the leader unit.

pub mod endpoint;
pub mod error;
pub mod flags;
pub mod lifecycle;
pub mod relation;

pub use endpoint::Endpoint;
pub use error::{RelationError, RelationResult};
pub use flags::FlagSet;
pub use lifecycle::{EndpointState, RelationEvent};
pub use relation::{RelationData, RelationHandle, RelationId};
