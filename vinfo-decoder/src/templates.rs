//! Vehicle type templates
//!
//! A template holds default wheels/tyres text, extra records and notes for
//! one vehicle type, keyed by (make, model, engine code, production year,
//! type label). The decode path only reads templates; a matched template is
//! exposed as a synthetic lowest-priority record so it merges like any other
//! source. Templates are created or updated by an administrative upsert.

use crate::types::{SourceId, VehicleRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use vinfo_common::{Error, Result};

/// Lookup and identity key of a template
///
/// `make` and `model` are mandatory; the other parts narrow a lookup only
/// when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateKey {
    pub make: String,
    pub model: String,
    pub engine_code: Option<String>,
    pub production_year: Option<i32>,
    pub type_label: Option<String>,
}

impl TemplateKey {
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            engine_code: None,
            production_year: None,
            type_label: None,
        }
    }

    /// Key derived from decoded data, or `None` without make and model
    pub fn from_record(record: &VehicleRecord) -> Option<Self> {
        Some(Self {
            make: record.make.clone()?,
            model: record.model.clone()?,
            engine_code: record.engine_code.clone(),
            production_year: record.production_year,
            type_label: record.type_label.clone(),
        })
    }

    /// True when `template` satisfies this key as a lookup filter
    pub fn matches(&self, template: &VehicleTypeTemplate) -> bool {
        let key = &template.key;
        key.make == self.make
            && key.model == self.model
            && filter_matches(&self.engine_code, &key.engine_code)
            && filter_matches(&self.production_year, &key.production_year)
            && filter_matches(&self.type_label, &key.type_label)
    }
}

fn filter_matches<T: PartialEq>(wanted: &Option<T>, actual: &Option<T>) -> bool {
    wanted.is_none() || wanted == actual
}

/// Stored template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTypeTemplate {
    pub id: i64,
    #[serde(flatten)]
    pub key: TemplateKey,
    pub wheels_and_tyres: Option<String>,
    pub extra_records: Option<String>,
    pub default_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleTypeTemplate {
    /// Synthetic record tagged `template`, or `None` when the template holds
    /// no usable text
    ///
    /// Default notes are appended to the extra records after a blank line.
    pub fn to_record(&self) -> Option<VehicleRecord> {
        let wheels = non_blank(&self.wheels_and_tyres);
        let extra = non_blank(&self.extra_records);
        let notes = non_blank(&self.default_notes);

        let extra_records = match (extra, notes) {
            (Some(extra), Some(notes)) => Some(format!("{}\n\n{}", extra, notes)),
            (Some(extra), None) => Some(extra.to_string()),
            (None, Some(notes)) => Some(notes.to_string()),
            (None, None) => None,
        };

        if wheels.is_none() && extra_records.is_none() {
            return None;
        }

        Some(VehicleRecord {
            wheels_and_tyres_text: wheels.map(str::to_string),
            extra_records_text: extra_records,
            ..VehicleRecord::from_source(SourceId::Template)
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Create-or-update request; identity is the exact key (absent parts included)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateUpsert {
    pub key: TemplateKey,
    pub wheels_and_tyres: Option<String>,
    pub extra_records: Option<String>,
    pub default_notes: Option<String>,
}

impl TemplateUpsert {
    /// Reject keys whose make or model is blank
    pub fn validate(&self) -> Result<()> {
        if self.key.make.trim().is_empty() || self.key.model.trim().is_empty() {
            return Err(Error::InvalidInput(
                "make and model are required for a template".to_string(),
            ));
        }
        Ok(())
    }
}

/// Persistence collaborator for templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// At most one template matching `key`
    async fn find_template(&self, key: &TemplateKey) -> Result<Option<VehicleTypeTemplate>>;

    /// Create a template or update the one with exactly the same key
    async fn upsert_template(&self, upsert: TemplateUpsert) -> Result<VehicleTypeTemplate>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Process-local template store
///
/// Used in tests and when no database is configured.
#[derive(Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<Vec<VehicleTypeTemplate>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn find_template(&self, key: &TemplateKey) -> Result<Option<VehicleTypeTemplate>> {
        let templates = self.templates.read().await;
        let found = templates.iter().find(|t| key.matches(t)).cloned();
        debug!(
            make = %key.make,
            model = %key.model,
            found = found.is_some(),
            "Template lookup"
        );
        Ok(found)
    }

    async fn upsert_template(&self, upsert: TemplateUpsert) -> Result<VehicleTypeTemplate> {
        upsert.validate()?;
        let now = Utc::now();

        // Single write guard keeps select-then-write atomic
        let mut templates = self.templates.write().await;

        if let Some(existing) = templates.iter_mut().find(|t| t.key == upsert.key) {
            existing.wheels_and_tyres = upsert.wheels_and_tyres;
            existing.extra_records = upsert.extra_records;
            existing.default_notes = upsert.default_notes;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let id = templates.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let template = VehicleTypeTemplate {
            id,
            key: upsert.key,
            wheels_and_tyres: upsert.wheels_and_tyres,
            extra_records: upsert.extra_records,
            default_notes: upsert.default_notes,
            created_at: now,
            updated_at: now,
        };
        templates.push(template.clone());
        Ok(template)
    }
}
