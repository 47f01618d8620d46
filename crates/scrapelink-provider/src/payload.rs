//! Wire payloads for the scrape interface.
//!
//! These records serialize to the exact relation-data shapes the
//! consuming side expects: `scrape_jobs` (a JSON list of job blocks)
//! and `scrape_metadata` (a JSON object identifying the publishing
//! application), plus two plain-string unit-scoped addressing keys.
//! The job block follows the Prometheus `scrape_config` schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use scrapelink_relation::RelationData;

/// Unit-scoped key carrying the Prometheus-safe unit name.
pub const UNIT_NAME_KEY: &str = "prometheus_scrape_unit_name";

/// Unit-scoped key carrying the unit's ingress address.
pub const UNIT_ADDRESS_KEY: &str = "prometheus_scrape_unit_address";

/// Application-scoped key carrying the published job list (JSON).
pub const SCRAPE_JOBS_KEY: &str = "scrape_jobs";

/// Application-scoped key identifying the publishing application (JSON).
pub const SCRAPE_METADATA_KEY: &str = "scrape_metadata";

/// Default target pattern; the consuming side substitutes the `*`
/// wildcard with the advertised unit address.
pub const DEFAULT_TARGET: &str = "*:80";

/// Default metrics path.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

// ── Target groups ──────────────────────────────────────────────────

/// One static-config target group: addresses to scrape, plus labels
/// attached to every series they yield.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetGroup {
    /// Target addresses, `<host:port>`.
    pub targets: Vec<String>,
    /// Labels applied to all targets in the group.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Default for TargetGroup {
    fn default() -> Self {
        Self {
            targets: vec![DEFAULT_TARGET.to_string()],
            labels: BTreeMap::new(),
        }
    }
}

impl TargetGroup {
    /// Group scraping the given targets, without labels.
    pub fn new(targets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            labels: BTreeMap::new(),
        }
    }

    /// Attach a label to the group.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

// ── Scrape jobs ────────────────────────────────────────────────────

/// One scrape job block, as published under `scrape_jobs`.
///
/// Job names are opaque to Prometheus; the empty name is a valid
/// (default) job. Within a published list the name is the unique key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeJob {
    /// Name uniquely identifying the job within `scrape_jobs`.
    pub job_name: String,
    /// HTTP path the targets expose metrics on.
    pub metrics_path: String,
    /// Static target groups to poll.
    pub static_configs: Vec<TargetGroup>,
}

impl Default for ScrapeJob {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            static_configs: vec![TargetGroup::default()],
        }
    }
}

impl ScrapeJob {
    /// Job with the given name, default path, and default targets.
    pub fn named(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            ..Self::default()
        }
    }

    pub fn with_metrics_path(mut self, metrics_path: impl Into<String>) -> Self {
        self.metrics_path = metrics_path.into();
        self
    }

    pub fn with_static_configs(mut self, static_configs: Vec<TargetGroup>) -> Self {
        self.static_configs = static_configs;
        self
    }

    /// Replace an empty target list with the default group.
    pub(crate) fn or_default_targets(mut self) -> Self {
        if self.static_configs.is_empty() {
            self.static_configs = vec![TargetGroup::default()];
        }
        self
    }
}

// ── Metadata ───────────────────────────────────────────────────────

/// Identity of the publishing application, published under
/// `scrape_metadata`. Consumers use it to build topology labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeMetadata {
    /// Model (namespace) the application runs in.
    pub model: String,
    /// Unique identifier of the model.
    pub model_uuid: String,
    /// Application name.
    pub application: String,
}

// ── Unit record ────────────────────────────────────────────────────

/// Unit-scoped addressing record: where this unit can be scraped.
///
/// Published as two plain-string keys rather than JSON, since the
/// consuming side reads them raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitScrapeRecord {
    /// Prometheus-safe unit name (`/` replaced by `-`).
    pub unit_name: String,
    /// Ingress address the unit advertises on the relation.
    pub unit_address: String,
}

impl UnitScrapeRecord {
    /// Write the record into a unit-scoped store.
    pub fn publish_to(&self, data: &mut RelationData) {
        data.insert(UNIT_NAME_KEY, self.unit_name.clone());
        data.insert(UNIT_ADDRESS_KEY, self.unit_address.clone());
    }

    /// Remove the record's keys from a unit-scoped store, if present.
    pub fn retract_from(data: &mut RelationData) {
        data.remove(UNIT_NAME_KEY);
        data.remove(UNIT_ADDRESS_KEY);
    }

    /// Read the record back from a unit-scoped store; `None` unless
    /// both keys are present.
    pub fn read_from(data: &RelationData) -> Option<Self> {
        Some(Self {
            unit_name: data.get(UNIT_NAME_KEY)?.to_string(),
            unit_address: data.get(UNIT_ADDRESS_KEY)?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_job_wire_format() {
        let encoded = serde_json::to_string(&ScrapeJob::default()).unwrap();
        assert_eq!(
            encoded,
            r#"{"job_name":"","metrics_path":"/metrics","static_configs":[{"targets":["*:80"]}]}"#
        );
    }

    #[test]
    fn customized_job_wire_format() {
        let job = ScrapeJob::named("somename")
            .with_metrics_path("/custom-metrics")
            .with_static_configs(vec![TargetGroup::new(["*:4242"])]);
        let encoded = serde_json::to_string(&job).unwrap();
        assert_eq!(
            encoded,
            r#"{"job_name":"somename","metrics_path":"/custom-metrics","static_configs":[{"targets":["*:4242"]}]}"#
        );
    }

    #[test]
    fn labels_serialize_only_when_present() {
        let plain = serde_json::to_string(&TargetGroup::new(["*:9100"])).unwrap();
        assert_eq!(plain, r#"{"targets":["*:9100"]}"#);

        let labeled = TargetGroup::new(["*:9100"]).with_label("tier", "backend");
        let encoded = serde_json::to_string(&labeled).unwrap();
        assert_eq!(
            encoded,
            r#"{"targets":["*:9100"],"labels":{"tier":"backend"}}"#
        );
    }

    #[test]
    fn target_group_parses_with_and_without_labels() {
        let plain: TargetGroup = serde_json::from_str(r#"{"targets":["*:80"]}"#).unwrap();
        assert!(plain.labels.is_empty());

        let labeled: TargetGroup =
            serde_json::from_str(r#"{"targets":["*:80"],"labels":{"a":"b"}}"#).unwrap();
        assert_eq!(labeled.labels.get("a").map(String::as_str), Some("b"));
    }

    #[test]
    fn empty_static_configs_fall_back_to_default() {
        let job = ScrapeJob::named("x")
            .with_static_configs(Vec::new())
            .or_default_targets();
        assert_eq!(job.static_configs, vec![TargetGroup::default()]);

        // A populated list is left alone.
        let job = ScrapeJob::named("x")
            .with_static_configs(vec![TargetGroup::new(["*:4242"])])
            .or_default_targets();
        assert_eq!(job.static_configs, vec![TargetGroup::new(["*:4242"])]);
    }

    #[test]
    fn metadata_wire_format() {
        let metadata = ScrapeMetadata {
            model: "mymodel".to_string(),
            model_uuid: "47bfebeb-92ee-4cfa-b768-cd29749d33ac".to_string(),
            application: "myapp".to_string(),
        };
        let encoded = serde_json::to_string(&metadata).unwrap();
        assert_eq!(
            encoded,
            r#"{"model":"mymodel","model_uuid":"47bfebeb-92ee-4cfa-b768-cd29749d33ac","application":"myapp"}"#
        );
    }

    #[test]
    fn unit_record_publish_retract() {
        let mut data = RelationData::new();
        let record = UnitScrapeRecord {
            unit_name: "myapp-0".to_string(),
            unit_address: "192.0.2.42".to_string(),
        };

        record.publish_to(&mut data);
        assert_eq!(data.get(UNIT_NAME_KEY), Some("myapp-0"));
        assert_eq!(data.get(UNIT_ADDRESS_KEY), Some("192.0.2.42"));
        assert_eq!(UnitScrapeRecord::read_from(&data), Some(record));

        UnitScrapeRecord::retract_from(&mut data);
        assert!(data.is_empty());
        assert_eq!(UnitScrapeRecord::read_from(&data), None);

        // Retracting from an empty store is a no-op.
        UnitScrapeRecord::retract_from(&mut data);
        assert!(data.is_empty());
    }
}
