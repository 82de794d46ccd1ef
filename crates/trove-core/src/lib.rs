//! # trove-core
//! Foundation types, configuration and traits for Trove wallet scoring.

pub mod config;
pub mod constants;
pub mod error;
pub mod stats;
pub mod traits;
pub mod types;
