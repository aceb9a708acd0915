//! Adapters implementing the domain ports.

pub mod recorders;

pub use recorders::{InMemorySessionRecorder, JsonlSessionRecorder};
