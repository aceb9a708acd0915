pub mod completion;
pub mod config;
pub mod gamification;
pub mod intent;
pub mod phase;
pub mod routing;
pub mod session;
pub mod task;

pub use completion::{CompletionState, PhaseReset, StepResult};
pub use config::{CompletionWeights, Config, EngineConfig, GamificationConfig, LoggingConfig};
pub use gamification::{ChallengeKind, IssuedChallenge};
pub use intent::{ConversationTurn, FamilyMatch, IntentFamily, IntentSignal, Speaker};
pub use phase::Phase;
pub use routing::{ResponseMode, RoutingDecision, SuppressionReason};
pub use session::SessionRecord;
pub use task::{CompletionReason, TaskDefinition, TaskHistory, TaskInstance, TaskStatus};
