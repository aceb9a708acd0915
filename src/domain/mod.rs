//! Domain layer for the Atelier phase-task engine
//!
//! This module contains the core models, errors, and ports.

pub mod error;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use error::{EngineError, EngineResult};
