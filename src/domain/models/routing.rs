//! Response modes and routing decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::gamification::ChallengeKind;

/// How the downstream generator should answer the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "kind", rename_all = "snake_case")]
pub enum ResponseMode {
    /// Socratic questioning.
    ReflectiveDialogue,
    /// Direct knowledge.
    InformationalGuidance,
    /// A game-like prompt of the given kind.
    GamifiedChallenge(ChallengeKind),
}

impl ResponseMode {
    pub fn is_challenge(&self) -> bool {
        matches!(self, Self::GamifiedChallenge(_))
    }

    pub fn challenge_kind(&self) -> Option<ChallengeKind> {
        match self {
            Self::GamifiedChallenge(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReflectiveDialogue => f.write_str("reflective_dialogue"),
            Self::InformationalGuidance => f.write_str("informational_guidance"),
            Self::GamifiedChallenge(kind) => write!(f, "gamified_challenge({kind})"),
        }
    }
}

/// Why a candidate challenge was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionReason {
    /// Upstream policy disallows games.
    GamificationDisabled,
    /// The same kind was issued inside the cooldown window.
    Cooldown,
    /// The same kind was the last challenge issued.
    Variety,
}

/// Result of a routing decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub mode: ResponseMode,
    /// Short explanation for logs and export.
    pub reason: String,
    /// Challenge that was considered and then suppressed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppressed: Option<(ChallengeKind, SuppressionReason)>,
}
