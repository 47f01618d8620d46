//! Unit environment context.
//!
//! Everything the publisher needs from the host environment (unit and
//! application identity, model identity, leadership), injected
//! explicitly at construction instead of read from ambient process
//! state, so the component stays testable without a host runtime.

use std::path::Path;

use serde::Deserialize;

use crate::payload::ScrapeMetadata;

/// Host-environment facts for the local unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitContext {
    unit: String,
    application: String,
    model: String,
    model_uuid: String,
    leader: bool,
}

impl UnitContext {
    /// Context for the given unit. The application name is derived from
    /// the unit name's prefix (`myapp/0` → `myapp`); leadership starts
    /// off.
    pub fn new(
        unit: impl Into<String>,
        model: impl Into<String>,
        model_uuid: impl Into<String>,
    ) -> Self {
        let unit = unit.into();
        let application = application_of(&unit);
        Self {
            unit,
            application,
            model: model.into(),
            model_uuid: model_uuid.into(),
            leader: false,
        }
    }

    /// Override the derived application name.
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = application.into();
        self
    }

    /// Set whether this unit holds application leadership.
    pub fn with_leader(mut self, leader: bool) -> Self {
        self.leader = leader;
        self
    }

    /// Load the context from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: ContextFile = toml::from_str(&content)?;

        let mut context = Self::new(raw.unit, raw.model, raw.model_uuid);
        if let Some(application) = raw.application {
            context = context.with_application(application);
        }
        Ok(context.with_leader(raw.leader.unwrap_or(false)))
    }

    /// Unit identifier, e.g. `myapp/0`.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Application name.
    pub fn application(&self) -> &str {
        &self.application
    }

    /// Model (namespace) name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Unique identifier of the model.
    pub fn model_uuid(&self) -> &str {
        &self.model_uuid
    }

    /// Whether this unit holds application leadership.
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Unit name with every `/` replaced by `-`, safe for use as a
    /// Prometheus label value.
    pub fn prometheus_unit_name(&self) -> String {
        self.unit.replace('/', "-")
    }
}

impl From<&UnitContext> for ScrapeMetadata {
    fn from(context: &UnitContext) -> Self {
        Self {
            model: context.model.clone(),
            model_uuid: context.model_uuid.clone(),
            application: context.application.clone(),
        }
    }
}

/// Application prefix of a unit name (`myapp/0` → `myapp`).
fn application_of(unit: &str) -> String {
    match unit.split_once('/') {
        Some((application, _)) => application.to_string(),
        None => unit.to_string(),
    }
}

/// Raw shape of a context TOML file.
#[derive(Debug, Deserialize)]
struct ContextFile {
    unit: String,
    application: Option<String>,
    model: String,
    model_uuid: String,
    leader: Option<bool>,
}
