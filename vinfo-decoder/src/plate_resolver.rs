//! Plate-only lookups
//!
//! A registration plate has no decodable structure, so the registries are
//! the only sources: the national registry first, the open-data source only
//! when the national registry has nothing.

use crate::registry::{normalize_plate, RegistryClient};
use crate::types::VehicleRecord;
use std::sync::Arc;
use tracing::{debug, info};

/// Sequential national-then-secondary plate resolution
pub struct PlateResolver {
    national: Arc<dyn RegistryClient>,
    open_data: Arc<dyn RegistryClient>,
}

impl PlateResolver {
    pub fn new(national: Arc<dyn RegistryClient>, open_data: Arc<dyn RegistryClient>) -> Self {
        Self {
            national,
            open_data,
        }
    }

    /// Resolve a raw plate to the first record any registry returns
    pub async fn resolve(&self, raw_plate: &str) -> Option<VehicleRecord> {
        let plate = normalize_plate(raw_plate);
        if plate.is_empty() {
            debug!("Empty plate, nothing to resolve");
            return None;
        }

        if let Some(record) = self.national.fetch_by_plate(&plate).await {
            return Some(record);
        }

        debug!(plate = %plate, "National registry had no data, trying open-data source");
        if let Some(record) = self.open_data.fetch_by_plate(&plate).await {
            return Some(record);
        }

        info!(plate = %plate, "No registry returned data for plate");
        None
    }
}
