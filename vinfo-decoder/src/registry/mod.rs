//! External vehicle registry clients
//!
//! Each client wraps one optional, unreliable vehicle-data source and
//! normalizes its payload into a `VehicleRecord`.
//!
//! # Clients
//! 1. **national** - authoritative national registry (`api_key` header)
//! 2. **open_data** - secondary open-data source, enrichment only (bearer token)
//!
//! # Failure Isolation
//! `lookup` reports failures as `RegistryError`; the provided `fetch_by_vin`
//! and `fetch_by_plate` methods log them and return `None`. A missing base URL
//! or credential turns a client into a permanent no-op.

pub mod mapping;
pub mod national;
pub mod normalize;
pub mod open_data;

pub use national::NationalRegistryClient;
pub use normalize::normalize_plate;
pub use open_data::OpenDataClient;

use crate::error::RegistryError;
use crate::types::{SourceId, VehicleRecord};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use vinfo_common::{Error, Result};

/// Lookup key sent to a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryQuery {
    Vin(String),
    Plate(String),
}

impl RegistryQuery {
    /// Query-string parameter (name, value)
    pub fn param(&self) -> (&'static str, &str) {
        match self {
            RegistryQuery::Vin(vin) => ("vin", vin),
            RegistryQuery::Plate(plate) => ("plate", plate),
        }
    }
}

impl fmt::Display for RegistryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (key, value) = self.param();
        write!(f, "{}={}", key, value)
    }
}

/// One external vehicle-data source
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Client name for logging
    fn name(&self) -> &'static str;

    /// Source identifier stamped on produced records
    fn source(&self) -> SourceId;

    /// True when both base URL and credential are present
    fn is_configured(&self) -> bool;

    /// Perform exactly one call for `query`
    ///
    /// # Errors
    /// Returns `RegistryError::NotConfigured` without any network activity
    /// when the client is disabled.
    async fn lookup(&self, query: &RegistryQuery) -> std::result::Result<VehicleRecord, RegistryError>;

    /// Best-effort lookup by normalized VIN; failures yield `None`
    async fn fetch_by_vin(&self, vin: &str) -> Option<VehicleRecord> {
        self.fetch(RegistryQuery::Vin(vin.to_string())).await
    }

    /// Best-effort lookup by normalized plate; failures yield `None`
    async fn fetch_by_plate(&self, plate: &str) -> Option<VehicleRecord> {
        self.fetch(RegistryQuery::Plate(plate.to_string())).await
    }

    /// Run `lookup` and convert every failure into "no data"
    async fn fetch(&self, query: RegistryQuery) -> Option<VehicleRecord> {
        match self.lookup(&query).await {
            Ok(record) => {
                debug!(source = self.name(), query = %query, "Registry returned data");
                Some(record)
            }
            Err(RegistryError::NotConfigured) => {
                debug!(source = self.name(), "Registry not configured, skipping");
                None
            }
            Err(RegistryError::NotFound) => {
                debug!(source = self.name(), query = %query, "Vehicle not found in registry");
                None
            }
            Err(e) => {
                warn!(
                    source = self.name(),
                    query = %query,
                    error = %e,
                    "Registry lookup failed (source degraded to no data)"
                );
                None
            }
        }
    }
}

/// Connection details of a configured registry
#[derive(Clone)]
pub(crate) struct Endpoint {
    pub http_client: Client,
    pub base_url: String,
    pub api_key: String,
}

impl Endpoint {
    /// Build an endpoint from settings, or `None` when the registry is disabled
    pub fn from_settings(
        settings: &vinfo_common::config::RegistrySettings,
        timeout: Duration,
        name: &str,
    ) -> Result<Option<Self>> {
        let Some((base_url, api_key)) = settings.credentials() else {
            debug!(source = name, "Registry disabled (base URL or API key missing)");
            return Ok(None);
        };

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            source = name,
            base_url = %base_url,
            timeout_secs = timeout.as_secs(),
            "Registry client configured"
        );

        Ok(Some(Self {
            http_client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }))
    }

    /// GET `base_url?<param>=<value>`
    pub fn get(&self, query: &RegistryQuery) -> RequestBuilder {
        self.http_client.get(&self.base_url).query(&[query.param()])
    }
}

/// Send a request and decode a JSON body, mapping failures to `RegistryError`
pub(crate) async fn send_json(request: RequestBuilder) -> std::result::Result<Value, RegistryError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RegistryError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
