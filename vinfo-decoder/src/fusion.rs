//! Priority merge of partial vehicle records
//!
//! Records arrive highest priority first. The first record carrying data
//! becomes the base; every later record may only fill fields the base still
//! lacks. A present value is never overwritten, whatever its source.

use crate::types::{SourceId, VehicleRecord};
use tracing::{debug, info};

/// Merge records in priority order
///
/// # Arguments
/// * `records` - partial records, highest priority first
/// * `fallback_plate` - plate used only when no record supplied one
///
/// # Returns
/// `None` when no record carries any data.
pub fn merge_records(
    records: Vec<VehicleRecord>,
    fallback_plate: Option<&str>,
) -> Option<VehicleRecord> {
    let mut contributing = records.into_iter().filter(VehicleRecord::has_data);

    let Some(mut merged) = contributing.next() else {
        debug!("No records with data to merge");
        return None;
    };
    debug!(base = ?merged.primary_source(), "Merge base selected");

    let mut sources = merged.source_priority.clone();
    for record in contributing {
        let filled = merged.fill_gaps_from(&record);
        if !filled.is_empty() {
            debug!(
                source = ?record.primary_source(),
                fields = ?filled,
                "Filled gaps from lower-priority source"
            );
        }
        sources.extend(record.source_priority);
    }
    merged.source_priority = ordered_sources(sources);

    if merged.plate.is_none() {
        if let Some(plate) = fallback_plate.map(str::trim).filter(|p| !p.is_empty()) {
            info!(plate = %plate, "Using configured fallback plate");
            merged.plate = Some(plate.to_string());
        }
    }

    Some(merged)
}

/// De-duplicate preserving first occurrence, national registry first
fn ordered_sources(sources: Vec<SourceId>) -> Vec<SourceId> {
    let mut ordered: Vec<SourceId> = Vec::with_capacity(sources.len());
    for source in sources {
        if !ordered.contains(&source) {
            ordered.push(source);
        }
    }

    if let Some(pos) = ordered
        .iter()
        .position(|s| *s == SourceId::NationalRegistry)
    {
        let national = ordered.remove(pos);
        ordered.insert(0, national);
    }
    ordered
}

// ============================================================================
// Tests
// ============================================================================
