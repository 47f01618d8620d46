//! scrapelink-provider — provider side of the Prometheus scrape interface.
//!
//! Drives a metrics endpoint for the unit that exposes scrape targets:
//! reacts to relation lifecycle events, and publishes scrape jobs,
//! application metadata, and per-unit addressing into the relation
//! stores that the consuming side reads.
//!
//! # Architecture
//!
//! ```text
//! Host runtime
//!   ├── UnitContext (unit, application, model, leadership)
//!   ├── NetworkBinding (endpoint → ingress address)
//!   └── lifecycle events + relation stores
//!         │
//!         ▼
//! ScrapeConfigPublisher
//!   ├── Endpoint state machine + readiness flags
//!   ├── expose_job() → unit record on every relation,
//!   │                  scrape_jobs + scrape_metadata when leader
//!   └── clear_job()  → retract unit record,
//!                      filter job out of scrape_jobs when leader
//! ```

pub mod context;
pub mod error;
pub mod network;
pub mod payload;
pub mod publisher;

pub use context::UnitContext;
pub use error::{ProviderError, ProviderResult};
pub use network::{NetworkBinding, StaticBinding};
pub use payload::*;
pub use publisher::ScrapeConfigPublisher;
