//! Integration test suite for Trove.
//!
//! Exercises the feature engine, the risk scorer and the file-backed pipeline
//! together on small hand-checked datasets and generated ones.

pub mod helpers;
