//! Challenge frequency control.
//!
//! `GamificationState` is an explicit value object: the engine owns one per
//! session and passes it by reference into routing, instead of routing reading
//! ambient session-wide toggles.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::models::{ChallengeKind, GamificationConfig, IssuedChallenge};

/// Rolling log of issued challenges plus the upstream allowance flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationState {
    /// Cleared by upstream policy (e.g. a serious-discussion context).
    pub gamification_allowed: bool,
    cooldown_turns: u64,
    capacity: usize,
    recent: VecDeque<IssuedChallenge>,
}

impl GamificationState {
    /// The rolling log never holds fewer entries than the cooldown spans, so a
    /// kind still on cooldown cannot be evicted.
    pub fn new(config: GamificationConfig) -> Self {
        let cooldown_span = usize::try_from(config.cooldown_turns).unwrap_or(usize::MAX);
        let capacity = config.window_size.max(cooldown_span).max(1);
        Self {
            gamification_allowed: config.enabled,
            cooldown_turns: config.cooldown_turns,
            capacity,
            recent: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    pub fn cooldown_turns(&self) -> u64 {
        self.cooldown_turns
    }

    /// Issued challenges, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &IssuedChallenge> {
        self.recent.iter()
    }

    pub fn last_issued(&self) -> Option<&IssuedChallenge> {
        self.recent.back()
    }

    /// Log an issued challenge, evicting the oldest entry when full.
    pub fn record(&mut self, kind: ChallengeKind, turn_index: u64) {
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(IssuedChallenge {
            kind,
            turn: turn_index,
        });
    }

    /// Whether `kind` was issued fewer than `cooldown_turns` turns ago.
    pub fn is_on_cooldown(&self, kind: ChallengeKind, turn_index: u64) -> bool {
        self.recent
            .iter()
            .rev()
            .find(|c| c.kind == kind)
            .is_some_and(|c| turn_index.saturating_sub(c.turn) < self.cooldown_turns)
    }

    /// Whether `kind` was the last challenge issued, however long ago.
    pub fn variety_violated(&self, kind: ChallengeKind) -> bool {
        self.last_issued().is_some_and(|c| c.kind == kind)
    }
}

impl Default for GamificationState {
    fn default() -> Self {
        Self::new(GamificationConfig::default())
    }
}
