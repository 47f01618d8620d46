//! Error types for the provider side of the scrape interface.

use thiserror::Error;

use scrapelink_relation::RelationError;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while publishing or retracting scrape configuration.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The network layer knows no ingress address for the endpoint.
    #[error("no ingress address for endpoint {0:?}")]
    UnresolvedBinding(String),

    /// A relation store operation failed.
    #[error(transparent)]
    Relation(#[from] RelationError),
}
