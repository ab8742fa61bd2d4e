//! vinfo-decoder library interface
//!
//! Resolves a VIN or registration plate into one canonical vehicle record by
//! combining local VIN decoding, external registries and stored type
//! templates.

pub mod db;
pub mod error;
pub mod fusion;
pub mod local_decoder;
pub mod orchestrator;
pub mod plate_resolver;
pub mod registry;
pub mod service_intervals;
pub mod templates;
pub mod types;
pub mod validator;

pub use crate::error::{DecodeError, RegistryError};
pub use crate::orchestrator::{DecodeOutcome, VehicleDecoder};
pub use crate::types::{DateValue, SourceId, ValidationResult, VehicleRecord};
