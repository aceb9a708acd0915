//! Session recorder implementations.
//!
//! - `InMemorySessionRecorder`: process-local store, used by the CLI replay and tests
//! - `JsonlSessionRecorder`: append-only JSON Lines file for export

mod in_memory;
mod jsonl;

pub use in_memory::InMemorySessionRecorder;
pub use jsonl::JsonlSessionRecorder;
