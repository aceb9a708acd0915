//! Message intent classification.
//!
//! Phrases are grouped into semantic families. A family matches when a
//! message contains enough distinct phrases from it, or any one of its strong
//! markers. Ambiguous families (transformation language) need several hits;
//! challenge responses are recognised from a single strong marker, including
//! markers the system itself emitted and the learner echoed back.
//!
//! Classification is pure: it reads the message and a bounded window of prior
//! turns and mutates nothing.

use serde::{Deserialize, Serialize};

use crate::domain::models::{ConversationTurn, FamilyMatch, IntentFamily, IntentSignal, Speaker};

/// Prefix shared by every challenge marker the engine emits.
pub const CHALLENGE_MARKER_PREFIX: &str = "[challenge:";

/// Phrase set and thresholds for one intent family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseFamily {
    pub family: IntentFamily,
    /// Weak phrases; only distinct hits count.
    pub phrases: Vec<String>,
    /// Any one of these is sufficient on its own.
    #[serde(default)]
    pub strong_markers: Vec<String>,
    /// Distinct weak hits needed for a match; 0 disables weak matching.
    pub min_hits: usize,
    /// Threshold used instead while a system-issued challenge is pending.
    #[serde(default)]
    pub pending_challenge_min_hits: Option<usize>,
}

impl PhraseFamily {
    fn new(
        family: IntentFamily,
        phrases: &[&str],
        strong_markers: &[&str],
        min_hits: usize,
        pending_challenge_min_hits: Option<usize>,
    ) -> Self {
        Self {
            family,
            phrases: phrases.iter().map(|p| (*p).to_string()).collect(),
            strong_markers: strong_markers.iter().map(|p| (*p).to_string()).collect(),
            min_hits,
            pending_challenge_min_hits,
        }
    }

    fn threshold(&self, challenge_pending: bool) -> usize {
        if challenge_pending {
            self.pending_challenge_min_hits.unwrap_or(self.min_hits)
        } else {
            self.min_hits
        }
    }

    fn evaluate(&self, message: &str, challenge_pending: bool) -> Option<FamilyMatch> {
        let mut hits: Vec<String> = Vec::new();
        for phrase in &self.phrases {
            if message.contains(phrase.as_str()) && !hits.contains(phrase) {
                hits.push(phrase.clone());
            }
        }
        let strong_hits: Vec<String> = self
            .strong_markers
            .iter()
            .filter(|m| contains_marker(message, m))
            .cloned()
            .collect();

        let threshold = self.threshold(challenge_pending);
        let weak_match = threshold > 0 && hits.len() >= threshold;
        let strong = !strong_hits.is_empty();

        if !(weak_match || strong) {
            return None;
        }

        let mut phrases = strong_hits;
        for hit in hits {
            if !phrases.contains(&hit) {
                phrases.push(hit);
            }
        }
        Some(FamilyMatch {
            family: self.family,
            phrases,
            strong: strong && !weak_match,
        })
    }
}

/// Built-in phrase table.
pub fn default_families() -> Vec<PhraseFamily> {
    vec![
        PhraseFamily::new(
            IntentFamily::Transformation,
            &[
                "transform",
                "convert",
                "repurpose",
                "adaptive reuse",
                "retrofit",
                "renovat",
                "reuse",
                "reimagine",
                "redesign",
                "into a",
                "turn it into",
                "turn this",
                "change the use",
                "new use",
                "existing building",
                "warehouse",
                "factory",
                "industrial",
                "community center",
                "community centre",
                "scale",
            ],
            &[],
            3,
            None,
        ),
        PhraseFamily::new(
            IntentFamily::Perspective,
            &[
                "perspective",
                "point of view",
                "as a visitor",
                "as a user",
                "as a resident",
                "as a child",
                "how would someone",
                "how would a",
                "feel like",
                "walking through",
                "experience",
                "visitor",
                "occupant",
            ],
            &["through the eyes of", "put myself in", "in their shoes"],
            2,
            None,
        ),
        PhraseFamily::new(
            IntentFamily::ChallengeResponse,
            &[
                "i would",
                "i'd",
                "i think",
                "i choose",
                "i pick",
                "my choice",
                "my guess",
                "option",
                "if i were",
                "i imagine",
                "i'd go with",
            ],
            &[
                CHALLENGE_MARKER_PREFIX,
                "my answer is",
                "here's my answer",
                "i choose option",
                "option a",
                "option b",
                "option c",
                "challenge accepted",
                "in my role as",
            ],
            0,
            Some(1),
        ),
        PhraseFamily::new(
            IntentFamily::HelpSeeking,
            &[
                "how do i",
                "how to",
                "what is",
                "what are",
                "how does",
                "what does",
                "explain",
                "help",
                "example",
                "tell me",
                "show me",
                "recommend",
                "not sure how",
            ],
            &[
                "can you explain",
                "please explain",
                "i need help",
                "i don't understand",
                "i do not understand",
            ],
            2,
            None,
        ),
    ]
}

/// Detects intent signals in learner messages.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    families: Vec<PhraseFamily>,
    history_window: usize,
}

impl IntentClassifier {
    pub fn new(history_window: usize) -> Self {
        Self::with_families(default_families(), history_window)
    }

    /// Use a custom phrase table. Phrases and markers are matched lowercase.
    pub fn with_families(families: Vec<PhraseFamily>, history_window: usize) -> Self {
        let families = families
            .into_iter()
            .map(|mut f| {
                f.phrases = f.phrases.iter().map(|p| normalize(p)).collect();
                f.strong_markers = f.strong_markers.iter().map(|p| normalize(p)).collect();
                f
            })
            .collect();
        Self {
            families,
            history_window,
        }
    }

    pub fn families(&self) -> &[PhraseFamily] {
        &self.families
    }

    /// Classify one message against the most recent turns.
    ///
    /// Empty or whitespace-only messages yield an all-false signal.
    pub fn classify(&self, message: &str, recent_history: &[ConversationTurn]) -> IntentSignal {
        let text = normalize(message);
        if text.is_empty() {
            return IntentSignal::none();
        }

        let window_start = recent_history.len().saturating_sub(self.history_window);
        let challenge_pending = challenge_pending(&recent_history[window_start..]);

        let mut signal = IntentSignal::none();
        for family in &self.families {
            if let Some(found) = family.evaluate(&text, challenge_pending) {
                signal.set(found.family);
                signal.matches.push(found);
            }
        }
        signal
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(6)
    }
}

/// Whether the latest system turn in the window issued a challenge that the
/// learner has not yet answered.
fn challenge_pending(window: &[ConversationTurn]) -> bool {
    for turn in window.iter().rev() {
        match turn.speaker {
            Speaker::System => return turn.text.to_lowercase().contains(CHALLENGE_MARKER_PREFIX),
            Speaker::Learner => {}
        }
    }
    false
}

/// Whether `marker` occurs in `message` as whole words. A marker edge that is
/// alphanumeric must not run into another alphanumeric character, so
/// "option a" does not match inside "option available".
fn contains_marker(message: &str, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }
    let first_is_word = marker.starts_with(char::is_alphanumeric);
    let last_is_word = marker.ends_with(char::is_alphanumeric);
    message.match_indices(marker).any(|(start, found)| {
        let before_ok = !first_is_word
            || !message[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let after_ok = !last_is_word
            || !message[start + found.len()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        before_ok && after_ok
    })
}

fn normalize(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
