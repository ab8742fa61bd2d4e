//! # vinfo Common Library
//!
//! Shared code for the vinfo crates including:
//! - Error types (`Error` enum, `Result` alias)
//! - Bootstrap configuration loading (TOML file + environment overrides)
//! - Data folder and database path resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
