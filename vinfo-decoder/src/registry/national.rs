//! National Vehicle Registry Client
//!
//! Queries the authoritative national vehicle technical-data API.
//!
//! # API Reference
//! - Request: `GET {base_url}?vin=<VIN>` or `GET {base_url}?plate=<PLATE>`
//! - Auth: `api_key: <key>` header
//! - Envelope: `{"Status": 1, "Data": {...}}` or `{"Success": true, "Data": {...}}`
//!
//! `Success: false`, any other status, or a missing/empty `Data` object means
//! the vehicle is unknown to the registry.

use super::mapping::map_vehicle_data;
use super::{send_json, Endpoint, RegistryClient, RegistryQuery};
use crate::error::RegistryError;
use crate::types::{SourceId, VehicleRecord};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use vinfo_common::config::RegistrySettings;
use vinfo_common::Result;

/// Header carrying the API key
const API_KEY_HEADER: &str = "api_key";

/// Envelope status value meaning "found"
const STATUS_OK: i64 = 1;

/// National registry client
///
/// A client built from incomplete settings never touches the network.
pub struct NationalRegistryClient {
    endpoint: Option<Endpoint>,
}

impl NationalRegistryClient {
    /// Create client from settings with a per-call timeout
    pub fn new(settings: &RegistrySettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::from_settings(settings, timeout, "national_registry")?,
        })
    }

    /// Client that is permanently unconfigured
    pub fn disabled() -> Self {
        Self { endpoint: None }
    }
}

#[async_trait]
impl RegistryClient for NationalRegistryClient {
    fn name(&self) -> &'static str {
        "national_registry"
    }

    fn source(&self) -> SourceId {
        SourceId::NationalRegistry
    }

    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn lookup(
        &self,
        query: &RegistryQuery,
    ) -> std::result::Result<VehicleRecord, RegistryError> {
        let endpoint = self.endpoint.as_ref().ok_or(RegistryError::NotConfigured)?;

        debug!(query = %query, "Querying national registry");
        let request = endpoint
            .get(query)
            .header(API_KEY_HEADER, endpoint.api_key.as_str());
        let body = send_json(request).await?;

        let data = unwrap_envelope(body)?;
        debug!(fields = data.len(), "National registry data received");
        Ok(map_vehicle_data(&data, query, SourceId::NationalRegistry))
    }
}

/// Extract the `Data` object from the response envelope
fn unwrap_envelope(body: Value) -> std::result::Result<Map<String, Value>, RegistryError> {
    let Value::Object(mut envelope) = body else {
        return Err(RegistryError::Parse("response is not a JSON object".to_string()));
    };

    let success = envelope.get("Success").and_then(Value::as_bool);
    if success == Some(false) {
        return Err(RegistryError::NotFound);
    }

    let status = envelope.get("Status").and_then(Value::as_i64);
    if status != Some(STATUS_OK) && success != Some(true) {
        return Err(RegistryError::NotFound);
    }

    match envelope.remove("Data") {
        Some(Value::Object(data)) if !data.is_empty() => Ok(data),
        _ => Err(RegistryError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_status_ok() {
        let data = unwrap_envelope(json!({"Status": 1, "Data": {"Typ": "1Z"}})).unwrap();
        assert_eq!(data.get("Typ"), Some(&json!("1Z")));
    }

    #[test]
    fn test_envelope_success_true() {
        let data = unwrap_envelope(json!({"Success": true, "Data": {"Typ": "1Z"}})).unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_envelope_not_found_variants() {
        for body in [
            json!({"Success": false, "Status": 1, "Data": {"Typ": "1Z"}}),
            json!({"Status": 0, "Data": {"Typ": "1Z"}}),
            json!({"Status": 1}),
            json!({"Status": 1, "Data": null}),
            json!({"Status": 1, "Data": []}),
            json!({"Status": 1, "Data": {}}),
        ] {
            assert!(
                matches!(unwrap_envelope(body.clone()), Err(RegistryError::NotFound)),
                "{} should be not found",
                body
            );
        }
    }

    #[test]
    fn test_envelope_rejects_non_object() {
        assert!(matches!(
            unwrap_envelope(json!([1, 2, 3])),
            Err(RegistryError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_client_is_noop() {
        let client =
            NationalRegistryClient::new(&RegistrySettings::default(), Duration::from_secs(5))
                .unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client
                .lookup(&RegistryQuery::Vin("TMBJF73T2B9044629".into()))
                .await,
            Err(RegistryError::NotConfigured)
        ));
        assert!(client.fetch_by_vin("TMBJF73T2B9044629").await.is_none());
    }
}
