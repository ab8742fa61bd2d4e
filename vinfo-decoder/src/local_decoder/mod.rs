//! Local VIN decoder
//!
//! Pure and network-free: derives whatever the VIN structure alone reveals.
//! - WMI (characters 1-3): manufacturer, country, plant
//! - Model year (character 10): most recent candidate of the year code
//! - Plant code (character 11) when the WMI entry has none
//! - Engine code: best-effort scan of characters 4-9
//!
//! Unknown codes leave the corresponding fields absent; nothing here fails.

pub mod tables;

use crate::types::{SourceId, VehicleRecord};
use tables::{EngineSpec, ENGINE_TABLE, WMI_TABLE, YEAR_TABLE};
use tracing::debug;

/// Engine code lengths tried, longest first
const ENGINE_CODE_LENGTHS: [usize; 3] = [4, 3, 2];

/// Decode a normalized, validated VIN into a record tagged `local`
pub fn decode_local(vin: &str) -> VehicleRecord {
    let chars: Vec<char> = vin.chars().collect();
    let mut record = VehicleRecord::from_source(SourceId::Local);
    record.vin = Some(vin.to_string());

    if chars.len() >= 3 {
        let wmi: String = chars[..3].iter().collect();
        if let Some(info) = WMI_TABLE.get(wmi.as_str()) {
            record.manufacturer = Some(info.manufacturer.to_string());
            record.make = Some(info.manufacturer.to_string());
            record.country_of_registration = Some(info.country.to_string());
            record.plant = info.plant.map(str::to_string);
            debug!(wmi = %wmi, manufacturer = info.manufacturer, "WMI decoded");
        } else {
            debug!(wmi = %wmi, "Unknown WMI");
        }
        record.wmi = Some(wmi);
    }

    if let Some(year) = chars.get(9).and_then(|&code| decode_model_year(code)) {
        record.model_year = Some(year);
        record.production_year = Some(year);
    }

    if record.plant.is_none() {
        record.plant = chars.get(10).map(char::to_string);
    }

    if let Some(engine) = find_engine(&chars) {
        record.engine_code = Some(engine.code.to_string());
        record.displacement_cc = Some(engine.displacement_cc);
        record.power_kw = Some(engine.power_kw);
        record.fuel_type = Some(engine.fuel.to_string());
        debug!(engine_code = engine.code, "Engine inferred from VIN");
    }

    record
}

/// Most recent calendar year for a model-year code
///
/// Year codes repeat every 30 years; the latest cycle is assumed.
pub fn decode_model_year(code: char) -> Option<i32> {
    YEAR_TABLE
        .get(&code)
        .and_then(|years| years.iter().copied().max())
}

/// First engine code found in characters 4-9, longest codes first
fn find_engine(chars: &[char]) -> Option<&'static EngineSpec> {
    let section = chars.get(3..9)?;

    for length in ENGINE_CODE_LENGTHS {
        for window in section.windows(length) {
            let code: String = window.iter().collect();
            if let Some(engine) = ENGINE_TABLE.get(code.as_str()) {
                return Some(engine);
            }
        }
    }
    None
}
