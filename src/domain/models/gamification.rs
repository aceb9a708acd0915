//! Gamified challenge kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Flavour of a game-like prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Reimagine an existing building or program under a new use.
    Transformation,
    /// Inhabit the perspective of a user, client, or passer-by.
    RolePlay,
    /// Narrate a walk through the space over time.
    SpatialStorytelling,
    /// Resolve a deliberately conflicting set of constraints.
    ConstraintPuzzle,
}

impl ChallengeKind {
    pub const ALL: [Self; 4] = [
        Self::Transformation,
        Self::RolePlay,
        Self::SpatialStorytelling,
        Self::ConstraintPuzzle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transformation => "transformation",
            Self::RolePlay => "role_play",
            Self::SpatialStorytelling => "spatial_storytelling",
            Self::ConstraintPuzzle => "constraint_puzzle",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "transformation" => Some(Self::Transformation),
            "role_play" | "roleplay" => Some(Self::RolePlay),
            "spatial_storytelling" | "storytelling" => Some(Self::SpatialStorytelling),
            "constraint_puzzle" | "puzzle" => Some(Self::ConstraintPuzzle),
            _ => None,
        }
    }

    /// Marker the engine writes into the system side of the conversation when
    /// it issues this challenge. Echoes of it identify challenge responses.
    pub fn marker(&self) -> String {
        format!("[challenge:{}]", self.as_str())
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A challenge that was issued at a given turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedChallenge {
    pub kind: ChallengeKind,
    pub turn: u64,
}
