//! Open-data vehicle source client
//!
//! Thin secondary source used only to enrich records. The body is the flat
//! vehicle object, optionally wrapped as `{"data": {...}}`, authenticated with
//! a bearer token.

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

/// Open-data client
pub struct OpenDataClient {
    endpoint: Option<Endpoint>,
}

impl OpenDataClient {
    pub fn new(settings: &RegistrySettings, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::from_settings(settings, timeout, "open_data")?,
        })
    }

    pub fn disabled() -> Self {
        Self { endpoint: None }
    }
}

#[async_trait]
impl RegistryClient for OpenDataClient {
    fn name(&self) -> &'static str {
        "open_data"
    }

    fn source(&self) -> SourceId {
        SourceId::OpenData
    }

    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn lookup(
        &self,
        query: &RegistryQuery,
    ) -> std::result::Result<VehicleRecord, RegistryError> {
        let endpoint = self.endpoint.as_ref().ok_or(RegistryError::NotConfigured)?;

        debug!(query = %query, "Querying open-data source");
        let request = endpoint.get(query).bearer_auth(&endpoint.api_key);
        let body = send_json(request).await?;

        let data = unwrap_payload(body)?;
        Ok(map_vehicle_data(&data, query, SourceId::OpenData))
    }
}

fn unwrap_payload(body: Value) -> std::result::Result<Map<String, Value>, RegistryError> {
    let Value::Object(mut payload) = body else {
        return Err(RegistryError::Parse("response is not a JSON object".to_string()));
    };

    if matches!(payload.get("data"), Some(Value::Object(_))) {
        if let Some(Value::Object(inner)) = payload.remove("data") {
            payload = inner;
        }
    }

    if payload.is_empty() {
        return Err(RegistryError::NotFound);
    }
    Ok(payload)
}
