//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - SessionRecorder: persistence of task transitions and completion snapshots
//!
//! These traits keep the engine independent of any storage format.

pub mod null_recorder;
pub mod session_recorder;

pub use null_recorder::NullSessionRecorder;
pub use session_recorder::SessionRecorder;
