//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use std::sync::Arc;

use atelier::{EngineConfig, PhaseTaskEngine, StepResult, TaskCatalog};
use tempfile::TempDir;
use uuid::Uuid;

/// Message that trips the transformation family with plenty of margin.
pub const WAREHOUSE: &str =
    "I'm converting this warehouse into a community center, how to transform the industrial scale";

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Engine over the built-in catalog with default tuning.
pub fn engine() -> PhaseTaskEngine {
    engine_with(TaskCatalog::builtin(), &EngineConfig::default())
}

pub fn engine_with(catalog: TaskCatalog, config: &EngineConfig) -> PhaseTaskEngine {
    PhaseTaskEngine::new(Uuid::new_v4(), Arc::new(catalog), config)
}

/// A passed checkpoint step with a quality score.
pub fn step(name: &str, quality: f64) -> StepResult {
    StepResult::scored(name, true, quality)
}
