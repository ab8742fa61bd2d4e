//! Core Types for vinfo-decoder
//!
//! Defines the canonical decoded record that every source produces and the
//! merge engine consumes:
//! - `VehicleRecord` - optional-valued vehicle fields plus source provenance
//! - `SourceId` - identifiers of the contributing sources
//! - `DateValue` - normalized calendar date or verbatim upstream text
//! - `ValidationResult` - VIN validation verdict with ordered messages

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Source Identifiers
// ============================================================================

/// Source that contributed data to a record
///
/// Declaration order is the fixed merge priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// National, authoritative vehicle registry
    NationalRegistry,
    /// Secondary open-data source (enrichment only)
    OpenData,
    /// Network-free structural VIN decoding
    Local,
    /// Learned vehicle type template
    Template,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::NationalRegistry => "national_registry",
            SourceId::OpenData => "open_data",
            SourceId::Local => "local",
            SourceId::Template => "template",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Date Values
// ============================================================================

/// Date-like registry value
///
/// Parsed dates serialize as `YYYY-MM-DD`; text that could not be parsed is
/// kept verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Calendar(NaiveDate),
    Verbatim(String),
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Calendar(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DateValue::Verbatim(raw) => f.write_str(raw),
        }
    }
}

// ============================================================================
// Decoded Vehicle Record
// ============================================================================

/// Canonical decoded vehicle record
///
/// Every data field is either absent (unknown) or holds a validated value.
/// Producers never store empty strings or empty tyre sets as placeholders.
/// Built fresh per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement_cc: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_kw: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_weight_kg: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curb_weight_kg: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_standard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_registration_date: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_registration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wmi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_valid_until: Option<DateValue>,
    /// Tyre sizes, deduplicated and sorted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tyres: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tyres_raw_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_type_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheels_and_tyres_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_records_text: Option<String>,
    /// Contributing sources, ordered and de-duplicated
    #[serde(default)]
    pub source_priority: Vec<SourceId>,
}

impl VehicleRecord {
    /// Empty record tagged with its producing source
    pub fn from_source(source: SourceId) -> Self {
        Self {
            source_priority: vec![source],
            ..Default::default()
        }
    }

    /// Primary (first listed) source, if any
    pub fn primary_source(&self) -> Option<SourceId> {
        self.source_priority.first().copied()
    }

    /// True when the record identifies a vehicle (make, model or VIN)
    pub fn has_identity(&self) -> bool {
        self.make.is_some() || self.model.is_some() || self.vin.is_some()
    }
}

/// Generates the per-field helpers so the field list is written exactly once.
macro_rules! impl_record_fields {
    ($($field:ident),+ $(,)?) => {
        impl VehicleRecord {
            /// True when at least one data field is present
            ///
            /// `source_priority` is provenance, not data, and is ignored.
            pub fn has_data(&self) -> bool {
                $(self.$field.is_some())||+
            }

            /// Copy every field of `other` that is absent here
            ///
            /// Present values are never overwritten. Returns the names of the
            /// fields that were filled.
            pub fn fill_gaps_from(&mut self, other: &VehicleRecord) -> Vec<&'static str> {
                let mut filled = Vec::new();
                $(
                    if self.$field.is_none() && other.$field.is_some() {
                        self.$field = other.$field.clone();
                        filled.push(stringify!($field));
                    }
                )+
                filled
            }
        }
    };
}

impl_record_fields!(
    vin,
    plate,
    make,
    model,
    model_year,
    production_year,
    engine_code,
    displacement_cc,
    power_kw,
    fuel_type,
    transmission_type,
    body_type,
    doors,
    seats,
    gross_weight_kg,
    curb_weight_kg,
    emission_standard,
    first_registration_date,
    country_of_registration,
    manufacturer,
    wmi,
    plant,
    inspection_valid_until,
    tyres,
    tyres_raw_text,
    type_label,
    engine_type_label,
    wheels_and_tyres_text,
    extra_records_text,
);

// ============================================================================
// Validation Result
// ============================================================================

/// Result of validating a candidate VIN
///
/// `messages` holds errors when invalid and warnings (checksum mismatch) when
/// valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub messages: Vec<String>,
}

impl ValidationResult {
    pub fn valid(warnings: Vec<String>) -> Self {
        Self {
            is_valid: true,
            messages: warnings,
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            messages: errors,
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.is_valid && !self.messages.is_empty()
    }
}
