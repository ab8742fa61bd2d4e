//! Decode orchestration
//!
//! Combines every source for one request:
//!
//! ```text
//! VIN ─► validate ─► local decoder ─┐
//!                  ├► national  ────┤
//!                  └► open data ────┼─► template lookup ─► merge ─► DecodeOutcome
//!                                   │
//! plate ─► PlateResolver ───────────┴──────────────────────────────► DecodeOutcome
//! ```
//!
//! Registry calls for a VIN run concurrently; the merge order stays fixed
//! (national > open data > local > template). No failure below this layer
//! escapes as an error: it degrades a source to "no data" instead.

use crate::error::DecodeError;
use crate::fusion::merge_records;
use crate::local_decoder::decode_local;
use crate::plate_resolver::PlateResolver;
use crate::registry::{normalize_plate, NationalRegistryClient, OpenDataClient, RegistryClient};
use crate::templates::{TemplateKey, TemplateStore};
use crate::types::VehicleRecord;
use crate::validator::validate_vin;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vinfo_common::config::TomlConfig;
use vinfo_common::Result;

/// Result of one decode request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<VehicleRecord>,
    /// Validation errors on failure, validator warnings on success
    pub warnings: Vec<String>,
    /// Short human-readable reason for a failed decode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DecodeOutcome {
    fn decoded(record: VehicleRecord, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            record: Some(record),
            warnings,
            message: None,
        }
    }

    fn failed(error: DecodeError) -> Self {
        let warnings = match &error {
            DecodeError::InvalidVin(errors) => errors.clone(),
            DecodeError::NoDataFound(_) => Vec::new(),
        };
        Self {
            success: false,
            record: None,
            warnings,
            message: Some(error.to_string()),
        }
    }
}

/// Vehicle decoder service
///
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct VehicleDecoder {
    national: Arc<dyn RegistryClient>,
    open_data: Arc<dyn RegistryClient>,
    templates: Arc<dyn TemplateStore>,
    plate_resolver: PlateResolver,
    fallback_plates: HashMap<String, String>,
}

impl VehicleDecoder {
    /// Create decoder from explicit collaborators
    ///
    /// `fallback_plates` must be keyed by normalized VIN.
    pub fn new(
        national: Arc<dyn RegistryClient>,
        open_data: Arc<dyn RegistryClient>,
        templates: Arc<dyn TemplateStore>,
        fallback_plates: HashMap<String, String>,
    ) -> Self {
        let plate_resolver = PlateResolver::new(national.clone(), open_data.clone());
        Self {
            national,
            open_data,
            templates,
            plate_resolver,
            fallback_plates,
        }
    }

    /// Create decoder with registry clients built from configuration
    pub fn from_config(config: &TomlConfig, templates: Arc<dyn TemplateStore>) -> Result<Self> {
        let timeout = config.request_timeout();
        let national = NationalRegistryClient::new(&config.national_registry, timeout)?;
        let open_data = OpenDataClient::new(&config.open_data, timeout)?;

        info!(
            national = national.is_configured(),
            open_data = open_data.is_configured(),
            timeout_secs = timeout.as_secs(),
            "Vehicle decoder initialized"
        );

        Ok(Self::new(
            Arc::new(national),
            Arc::new(open_data),
            templates,
            config.fallback_plates.clone(),
        ))
    }

    /// Decode a raw VIN from every available source
    pub async fn decode_by_vin(&self, raw_vin: &str) -> DecodeOutcome {
        let check = validate_vin(raw_vin);
        if !check.result.is_valid {
            info!(vin = %check.vin, errors = ?check.result.messages, "Rejected invalid VIN");
            return DecodeOutcome::failed(DecodeError::InvalidVin(check.result.messages));
        }
        let vin = check.vin;
        let warnings = check.result.messages;
        for warning in &warnings {
            debug!(vin = %vin, warning = %warning, "VIN validation warning");
        }

        let local = decode_local(&vin);

        let (national, open_data) = tokio::join!(
            self.national.fetch_by_vin(&vin),
            self.open_data.fetch_by_vin(&vin)
        );

        let template = self
            .find_template(&[national.as_ref(), open_data.as_ref(), Some(&local)])
            .await;

        let records: Vec<VehicleRecord> = [national, open_data, Some(local), template]
            .into_iter()
            .flatten()
            .collect();

        let fallback_plate = self.fallback_plates.get(&vin).map(String::as_str);
        let Some(mut merged) = merge_records(records, fallback_plate) else {
            let error = DecodeError::NoDataFound(format!("VIN {}", vin));
            info!(vin = %vin, "{}", error);
            return DecodeOutcome::failed(error);
        };

        merged.vin = Some(vin.clone());

        info!(
            vin = %vin,
            sources = ?merged.source_priority,
            make = ?merged.make,
            model = ?merged.model,
            "Decoded vehicle by VIN"
        );
        DecodeOutcome::decoded(merged, warnings)
    }

    /// Decode a raw registration plate through the registries only
    pub async fn decode_by_plate(&self, raw_plate: &str) -> DecodeOutcome {
        let plate = normalize_plate(raw_plate);

        match self.plate_resolver.resolve(&plate).await {
            Some(record) if record.has_identity() => {
                info!(
                    plate = %plate,
                    source = ?record.primary_source(),
                    make = ?record.make,
                    "Decoded vehicle by plate"
                );
                DecodeOutcome::decoded(record, Vec::new())
            }
            Some(_) => {
                let error = DecodeError::NoDataFound(format!("plate {}", plate));
                info!(plate = %plate, "Registry record carries no vehicle identity");
                DecodeOutcome::failed(error)
            }
            None => {
                let error = DecodeError::NoDataFound(format!("plate {}", plate));
                info!(plate = %plate, "{}", error);
                DecodeOutcome::failed(error)
            }
        }
    }

    /// Template for the first candidate that yields a key
    ///
    /// Candidates are in key preference order. A store failure is logged and
    /// treated as "no template".
    async fn find_template(&self, candidates: &[Option<&VehicleRecord>]) -> Option<VehicleRecord> {
        let key = candidates
            .iter()
            .flatten()
            .find_map(|record| TemplateKey::from_record(record))?;

        match self.templates.find_template(&key).await {
            Ok(Some(template)) => {
                debug!(id = template.id, make = %key.make, model = %key.model, "Template matched");
                template.to_record()
            }
            Ok(None) => None,
            Err(e) => {
                warn!(make = %key.make, model = %key.model, error = %e, "Template lookup failed");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::mock::MockRegistry;
    use crate::templates::{MemoryTemplateStore, TemplateUpsert};
    use crate::types::SourceId;

    const VIN: &str = "TMBJF73T2B9044629";

    fn decoder(
        national: Arc<MockRegistry>,
        open_data: Arc<MockRegistry>,
        templates: Arc<MemoryTemplateStore>,
    ) -> VehicleDecoder {
        VehicleDecoder::new(national, open_data, templates, HashMap::new())
    }

    fn national_record() -> VehicleRecord {
        VehicleRecord {
            make: Some("ŠKODA".into()),
            model: Some("OCTAVIA".into()),
            production_year: Some(2011),
            ..VehicleRecord::from_source(SourceId::NationalRegistry)
        }
    }

    #[tokio::test]
    async fn test_invalid_vin_calls_no_registry() {
        let national = Arc::new(MockRegistry::returning(
            SourceId::NationalRegistry,
            national_record(),
        ));
        let open_data = Arc::new(MockRegistry::empty(SourceId::OpenData));
        let decoder = decoder(
            national.clone(),
            open_data.clone(),
            Arc::new(MemoryTemplateStore::new()),
        );

        let outcome = decoder.decode_by_vin("TMBJF73T2B904462").await;

        assert!(!outcome.success);
        assert!(outcome.record.is_none());
        assert_eq!(outcome.warnings, vec!["VIN must be 17 characters (got 16)"]);
        assert!(outcome.message.is_some());
        assert_eq!(national.call_count(), 0);
        assert_eq!(open_data.call_count(), 0);
    }

    #[tokio::test]
    async fn test_registry_data_wins_and_vin_is_forced() {
        let national = Arc::new(MockRegistry::returning(
            SourceId::NationalRegistry,
            national_record(),
        ));
        let open_data = Arc::new(MockRegistry::returning(
            SourceId::OpenData,
            VehicleRecord {
                make: Some("Audi".into()),
                seats: Some(5),
                ..VehicleRecord::from_source(SourceId::OpenData)
            },
        ));
        let decoder = decoder(
            national.clone(),
            open_data.clone(),
            Arc::new(MemoryTemplateStore::new()),
        );

        let outcome = decoder.decode_by_vin("tmbjf73t2b9044629").await;
        let record = outcome.record.unwrap();

        assert!(outcome.success);
        assert_eq!(record.vin.as_deref(), Some(VIN));
        assert_eq!(record.make.as_deref(), Some("ŠKODA"));
        assert_eq!(record.seats, Some(5));
        assert_eq!(
            record.source_priority,
            vec![SourceId::NationalRegistry, SourceId::OpenData, SourceId::Local]
        );
        assert_eq!(national.call_count(), 1);
        assert_eq!(open_data.call_count(), 1);
    }

    #[tokio::test]
    async fn test_template_keyed_from_national_record() {
        let templates = Arc::new(MemoryTemplateStore::new());
        templates
            .upsert_template(TemplateUpsert {
                key: TemplateKey::new("ŠKODA", "OCTAVIA"),
                wheels_and_tyres: Some("205/55 R16 91V".into()),
                extra_records: None,
                default_notes: Some("Kontrola DPF".into()),
            })
            .await
            .unwrap();

        let decoder = decoder(
            Arc::new(MockRegistry::returning(
                SourceId::NationalRegistry,
                national_record(),
            )),
            Arc::new(MockRegistry::empty(SourceId::OpenData)),
            templates,
        );

        let record = decoder.decode_by_vin(VIN).await.record.unwrap();

        assert_eq!(record.wheels_and_tyres_text.as_deref(), Some("205/55 R16 91V"));
        assert_eq!(record.extra_records_text.as_deref(), Some("Kontrola DPF"));
        assert_eq!(record.source_priority.last(), Some(&SourceId::Template));
    }

    #[tokio::test]
    async fn test_configured_fallback_plate() {
        let mut plates = HashMap::new();
        plates.insert(VIN.to_string(), "5J1 7444".to_string());
        let decoder = VehicleDecoder::new(
            Arc::new(MockRegistry::empty(SourceId::NationalRegistry)),
            Arc::new(MockRegistry::empty(SourceId::OpenData)),
            Arc::new(MemoryTemplateStore::new()),
            plates,
        );

        let record = decoder.decode_by_vin(VIN).await.record.unwrap();
        assert_eq!(record.plate.as_deref(), Some("5J1 7444"));
        assert_eq!(record.source_priority, vec![SourceId::Local]);
    }

    #[tokio::test]
    async fn test_plate_without_identity_fails() {
        let decoder = decoder(
            Arc::new(MockRegistry::returning(
                SourceId::NationalRegistry,
                VehicleRecord {
                    plate: Some("1AB2345".into()),
                    seats: Some(5),
                    ..VehicleRecord::from_source(SourceId::NationalRegistry)
                },
            )),
            Arc::new(MockRegistry::empty(SourceId::OpenData)),
            Arc::new(MemoryTemplateStore::new()),
        );

        let outcome = decoder.decode_by_plate("1AB 2345").await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message.as_deref(),
            Some("No data found for plate 1AB2345")
        );
    }

    #[tokio::test]
    async fn test_plate_returns_registry_record_directly() {
        let open_data = Arc::new(MockRegistry::returning(
            SourceId::OpenData,
            VehicleRecord {
                vin: Some(VIN.into()),
                ..VehicleRecord::from_source(SourceId::OpenData)
            },
        ));
        let decoder = decoder(
            Arc::new(MockRegistry::empty(SourceId::NationalRegistry)),
            open_data,
            Arc::new(MemoryTemplateStore::new()),
        );

        let outcome = decoder.decode_by_plate("5j1-7444").await;
        let record = outcome.record.unwrap();

        assert!(outcome.success);
        assert!(outcome.warnings.is_empty());
        // No local decoding on the plate path
        assert_eq!(record.source_priority, vec![SourceId::OpenData]);
        assert_eq!(record.make, None);
    }
}
