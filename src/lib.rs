//! Atelier - phase-task progression and response routing
//!
//! Atelier drives a learner through the ordered phases of a design process.
//! For every learner message it updates the phase's completion percent,
//! activates the task whose trigger window that percent falls into (recovering
//! windows that were skipped), classifies the message's intent, and decides
//! whether the reply should be reflective dialogue, informational guidance, or
//! a gamified challenge.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors, and the recorder port
//! - **Service Layer** (`services`): the engine and its components
//! - **Adapters** (`adapters`): session recorder implementations
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use atelier::{EngineConfig, PhaseTaskEngine, ResponseMode, TaskCatalog};
//! use uuid::Uuid;
//!
//! let mut engine = PhaseTaskEngine::new(
//!     Uuid::new_v4(),
//!     Arc::new(TaskCatalog::builtin()),
//!     &EngineConfig::default(),
//! );
//! engine.begin();
//! let outcome = engine.on_turn("Where should I start with the site?", None);
//! assert_eq!(outcome.response_mode, ResponseMode::ReflectiveDialogue);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{InMemorySessionRecorder, JsonlSessionRecorder};
pub use domain::models::{
    ChallengeKind, CompletionReason, CompletionState, Config, ConversationTurn, EngineConfig,
    IntentFamily, IntentSignal, Phase, ResponseMode, RoutingDecision, SessionRecord, StepResult,
    TaskDefinition, TaskInstance, TaskStatus,
};
pub use domain::ports::{NullSessionRecorder, SessionRecorder};
pub use domain::{EngineError, EngineResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    CompletionTracker, GamificationState, IntentClassifier, PhaseTaskEngine, ResponseRouter,
    SessionService, TaskCatalog, TaskLifecycle, TriggerResolver, TurnOutcome,
};
