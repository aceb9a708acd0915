//! Per-message intent signals and the conversation turns they are read from.

use serde::{Deserialize, Serialize};

use super::gamification::ChallengeKind;

/// Semantic family of phrases the classifier looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentFamily {
    /// Design-change language: converting, repurposing, retrofitting.
    Transformation,
    /// Requests to see the design through someone else's eyes.
    Perspective,
    /// Replies to a challenge the system issued.
    ChallengeResponse,
    /// Requests for direct information or explanation.
    HelpSeeking,
}

impl IntentFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transformation => "transformation",
            Self::Perspective => "perspective",
            Self::ChallengeResponse => "challenge_response",
            Self::HelpSeeking => "help_seeking",
        }
    }

    /// Challenge kind this family nominates when it matches, if any.
    pub fn challenge_kind(&self) -> Option<ChallengeKind> {
        match self {
            Self::Transformation => Some(ChallengeKind::Transformation),
            Self::Perspective => Some(ChallengeKind::RolePlay),
            Self::ChallengeResponse | Self::HelpSeeking => None,
        }
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Learner,
    System,
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ConversationTurn {
    pub fn learner(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Learner,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
        }
    }
}

/// Phrases that matched one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMatch {
    pub family: IntentFamily,
    /// Distinct phrases found in the message.
    pub phrases: Vec<String>,
    /// Whether a strong marker alone carried the match.
    pub strong: bool,
}

/// Flags detected in a single message. Ephemeral: lives for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSignal {
    pub is_challenge_response: bool,
    pub is_transformation_request: bool,
    pub is_perspective_request: bool,
    pub is_help_seeking: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<FamilyMatch>,
}

impl IntentSignal {
    /// All-false signal, used for empty or malformed messages.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether no flag is set.
    pub fn is_empty(&self) -> bool {
        !(self.is_challenge_response
            || self.is_transformation_request
            || self.is_perspective_request
            || self.is_help_seeking)
    }

    pub fn has(&self, family: IntentFamily) -> bool {
        match family {
            IntentFamily::Transformation => self.is_transformation_request,
            IntentFamily::Perspective => self.is_perspective_request,
            IntentFamily::ChallengeResponse => self.is_challenge_response,
            IntentFamily::HelpSeeking => self.is_help_seeking,
        }
    }

    pub(crate) fn set(&mut self, family: IntentFamily) {
        match family {
            IntentFamily::Transformation => self.is_transformation_request = true,
            IntentFamily::Perspective => self.is_perspective_request = true,
            IntentFamily::ChallengeResponse => self.is_challenge_response = true,
            IntentFamily::HelpSeeking => self.is_help_seeking = true,
        }
    }

    /// Challenge kind nominated by the matched families. Transformation
    /// outranks perspective.
    pub fn nominated_challenge(&self) -> Option<ChallengeKind> {
        [IntentFamily::Transformation, IntentFamily::Perspective]
            .into_iter()
            .find(|family| self.has(*family))
            .and_then(|family| family.challenge_kind())
    }
}
