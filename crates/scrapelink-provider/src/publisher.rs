//! Scrape configuration publisher.
//!
//! The provider-side driver for a metrics endpoint: it owns the
//! endpoint's lifecycle state and relation stores, and publishes scrape
//! jobs into them. Unit-scoped addressing keys are written by every
//! unit; the `scrape_jobs` list and `scrape_metadata` record are
//! application-scoped and written only while this unit holds
//! leadership.

use scrapelink_relation::{
    Endpoint, EndpointState, RelationEvent, RelationHandle, RelationId, flags,
};
use tracing::{debug, info, warn};

use crate::context::UnitContext;
use crate::error::{ProviderError, ProviderResult};
use crate::network::NetworkBinding;
use crate::payload::{
    SCRAPE_JOBS_KEY, SCRAPE_METADATA_KEY, ScrapeJob, ScrapeMetadata, UnitScrapeRecord,
};

/// Provider-side publisher for one metrics endpoint.
#[derive(Debug)]
pub struct ScrapeConfigPublisher {
    context: UnitContext,
    endpoint: Endpoint,
    ingress_address: String,
}

impl ScrapeConfigPublisher {
    /// Publisher for `endpoint_name`, advertising the address the
    /// binding resolves for it. Fails if the binding has no address
    /// for the endpoint; a publisher never exists half-addressed.
    pub fn new(
        context: UnitContext,
        endpoint_name: impl Into<String>,
        binding: &dyn NetworkBinding,
    ) -> ProviderResult<Self> {
        let endpoint_name = endpoint_name.into();
        let ingress_address = binding
            .ingress_address(&endpoint_name)
            .ok_or_else(|| ProviderError::UnresolvedBinding(endpoint_name.clone()))?;
        debug!(endpoint = %endpoint_name, %ingress_address, "resolved endpoint binding");

        Ok(Self {
            context,
            endpoint: Endpoint::new(endpoint_name),
            ingress_address,
        })
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Feed one lifecycle event through the endpoint state machine.
    pub fn handle_event(&mut self, event: RelationEvent) {
        self.endpoint.handle_event(event);
    }

    /// A remote unit joined the relation.
    pub fn on_joined(&mut self) {
        self.handle_event(RelationEvent::Joined);
    }

    /// Relation data changed on the remote side.
    pub fn on_changed(&mut self) {
        self.handle_event(RelationEvent::Changed);
    }

    /// The relation is going away.
    pub fn on_departed(&mut self) {
        self.handle_event(RelationEvent::Departed);
    }

    /// Attach a relation instance to the endpoint.
    pub fn add_relation(&mut self, relation: RelationHandle) {
        self.endpoint.insert_relation(relation);
    }

    /// Detach a relation instance, returning its stores.
    pub fn remove_relation(&mut self, id: &RelationId) -> Option<RelationHandle> {
        self.endpoint.remove_relation(id)
    }

    // ── Publishing ─────────────────────────────────────────────────

    /// Publish `job` on every attached relation and mark it exposed.
    ///
    /// Every unit writes its own addressing record into the unit
    /// store. The leader additionally overwrites the application
    /// store's `scrape_jobs` with a one-element list holding `job`,
    /// and refreshes `scrape_metadata`. A job with no target groups
    /// gets the default group.
    pub fn expose_job(&mut self, job: ScrapeJob) -> ProviderResult<()> {
        let job = job.or_default_targets();
        let is_leader = self.context.is_leader();
        let published_jobs = vec![job.clone()];
        let metadata = ScrapeMetadata::from(&self.context);
        let record = UnitScrapeRecord {
            unit_name: self.context.prometheus_unit_name(),
            unit_address: self.ingress_address.clone(),
        };

        for relation in self.endpoint.relations_mut() {
            record.publish_to(relation.unit_data_mut());
            if is_leader {
                let app_data = relation.app_data_mut();
                app_data.put_json(SCRAPE_JOBS_KEY, &published_jobs)?;
                app_data.put_json(SCRAPE_METADATA_KEY, &metadata)?;
            }
        }

        let flag = flags::exposed(self.endpoint.name(), &job.job_name);
        self.endpoint.flags_mut().set(flag);
        info!(
            endpoint = %self.endpoint.name(),
            job = %job.job_name,
            relations = self.endpoint.relation_count(),
            leader = is_leader,
            "exposed scrape job"
        );
        Ok(())
    }

    /// Retract `job_name` from every attached relation and drop its
    /// exposed flag.
    ///
    /// Every unit removes its addressing record. The leader also
    /// filters the job out of `scrape_jobs` and writes the remainder
    /// back, so consumers observe an explicit empty list rather than
    /// an absent key. A store holding unparseable `scrape_jobs` is
    /// treated as empty.
    pub fn clear_job(&mut self, job_name: &str) -> ProviderResult<()> {
        let is_leader = self.context.is_leader();

        for relation in self.endpoint.relations_mut() {
            UnitScrapeRecord::retract_from(relation.unit_data_mut());
            if !is_leader {
                continue;
            }

            let mut jobs: Vec<ScrapeJob> = match relation.app_data().get_json(SCRAPE_JOBS_KEY) {
                Ok(Some(jobs)) => jobs,
                Ok(None) => Vec::new(),
                Err(err) => {
                    warn!(
                        relation = %relation.id(),
                        error = %err,
                        "unparseable scrape_jobs, treating as empty"
                    );
                    Vec::new()
                }
            };
            jobs.retain(|job| job.job_name != job_name);
            relation.app_data_mut().put_json(SCRAPE_JOBS_KEY, &jobs)?;
        }

        let flag = flags::exposed(self.endpoint.name(), job_name);
        self.endpoint.flags_mut().clear(&flag);
        info!(
            endpoint = %self.endpoint.name(),
            job = %job_name,
            leader = is_leader,
            "cleared scrape job"
        );
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Endpoint this publisher drives.
    pub fn endpoint_name(&self) -> &str {
        self.endpoint.name()
    }

    /// Current lifecycle state of the endpoint.
    pub fn state(&self) -> EndpointState {
        self.endpoint.state()
    }

    /// Whether at least one remote unit has joined.
    pub fn is_connected(&self) -> bool {
        self.endpoint.is_connected()
    }

    /// Whether relation data has settled enough to publish over.
    pub fn is_available(&self) -> bool {
        self.endpoint.is_available()
    }

    /// Whether `job_name` is currently marked exposed.
    pub fn is_exposed(&self, job_name: &str) -> bool {
        let flag = flags::exposed(self.endpoint.name(), job_name);
        self.endpoint.flags().is_set(&flag)
    }

    /// Names of all jobs currently marked exposed, in flag order.
    pub fn exposed_jobs(&self) -> Vec<String> {
        let prefix = flags::exposed(self.endpoint.name(), "");
        self.endpoint
            .flags()
            .iter()
            .filter_map(|flag| flag.strip_prefix(&prefix))
            .map(str::to_string)
            .collect()
    }

    /// All raised flags, in sorted order.
    pub fn active_flags(&self) -> Vec<String> {
        self.endpoint.active_flags()
    }

    /// Look up an attached relation.
    pub fn relation(&self, id: &RelationId) -> Option<&RelationHandle> {
        self.endpoint.relation(id)
    }

    /// Look up an attached relation for writing.
    pub fn relation_mut(&mut self, id: &RelationId) -> Option<&mut RelationHandle> {
        self.endpoint.relation_mut(id)
    }

    /// Iterate all attached relations.
    pub fn relations(&self) -> impl Iterator<Item = &RelationHandle> {
        self.endpoint.relations()
    }

    /// Number of attached relations.
    pub fn relation_count(&self) -> usize {
        self.endpoint.relation_count()
    }

    /// Address advertised in unit addressing records.
    pub fn ingress_address(&self) -> &str {
        &self.ingress_address
    }

    /// Host-environment facts this publisher was built with.
    pub fn context(&self) -> &UnitContext {
        &self.context
    }
}
