//! Error types for vinfo-decoder
//!
//! Two layers:
//! - `RegistryError` stays inside registry clients and is converted to
//!   "no data" at the client boundary
//! - `DecodeError` is the orchestrator's request-level failure, turned into a
//!   `DecodeOutcome` with `success = false` at the public boundary

use thiserror::Error;

/// Failure of a single external registry call
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Base URL or credential missing; the client never attempts a call
    #[error("Registry not configured")]
    NotConfigured,

    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Call exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Upstream answered with a non-success HTTP status
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// Body was not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Upstream explicitly reported that the vehicle is unknown
    #[error("Vehicle not found")]
    NotFound,
}

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RegistryError::Timeout
        } else if let Some(status) = e.status() {
            RegistryError::Status(status.as_u16())
        } else if e.is_decode() {
            RegistryError::Parse(e.to_string())
        } else {
            RegistryError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> Self {
        RegistryError::Parse(e.to_string())
    }
}

/// Request-level decode failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Input is not a structurally valid VIN; nothing was decoded
    #[error("Invalid VIN: {}", .0.join("; "))]
    InvalidVin(Vec<String>),

    /// Every source came back empty
    #[error("No data found for {0}")]
    NoDataFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_messages() {
        let err = DecodeError::InvalidVin(vec![
            "VIN must be 17 characters (got 16)".into(),
            "bad char".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid VIN: VIN must be 17 characters (got 16); bad char"
        );

        let err = DecodeError::NoDataFound("plate 1AB2345".into());
        assert_eq!(err.to_string(), "No data found for plate 1AB2345");
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(RegistryError::from(json_err), RegistryError::Parse(_)));
    }
}
