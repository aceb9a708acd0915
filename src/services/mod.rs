pub mod completion_tracker;
pub mod engine;
pub mod gamification_controller;
pub mod intent_classifier;
pub mod response_router;
pub mod session_service;
pub mod task_catalog;
pub mod task_lifecycle;
pub mod trigger_resolver;

pub use completion_tracker::CompletionTracker;
pub use engine::{PhaseAdvance, PhaseTaskEngine, TurnOutcome};
pub use gamification_controller::GamificationState;
pub use intent_classifier::{default_families, IntentClassifier, PhraseFamily};
pub use response_router::{ResponseRouter, TaskContext};
pub use session_service::SessionService;
pub use task_catalog::TaskCatalog;
pub use task_lifecycle::TaskLifecycle;
pub use trigger_resolver::{AutoCompletionPlan, Resolution, TriggerResolver};
