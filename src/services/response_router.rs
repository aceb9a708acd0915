//! Response routing decision tree.
//!
//! Chooses how the generator should answer a learner message: reflective
//! dialogue, informational guidance, or a gamified challenge. First match wins:
//!
//! 1. a reply to an issued challenge gets reflective dialogue
//! 2. if a challenge is wanted but gamification is disallowed, reflective
//!    dialogue, whatever else the message says
//! 3. a wanted challenge on cooldown, or repeating the last kind, falls back to
//!    guidance or dialogue
//! 4. otherwise guidance for help requests, else the wanted challenge, else
//!    reflective dialogue
//!
//! A challenge is wanted when an intent family nominates a kind, or when a
//! task carrying a challenge kind was activated this turn.

use tracing::debug;

use crate::domain::models::{
    ChallengeKind, IntentSignal, ResponseMode, RoutingDecision, SuppressionReason, TaskDefinition,
};

use super::gamification_controller::GamificationState;

/// Task state relevant to routing one turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskContext<'a> {
    pub turn_index: u64,
    /// The task currently presented to the learner.
    pub active_task: Option<&'a TaskDefinition>,
    /// Whether `active_task` was activated during this turn.
    pub newly_activated: bool,
}

impl TaskContext<'_> {
    fn nominated_challenge(&self) -> Option<ChallengeKind> {
        if !self.newly_activated {
            return None;
        }
        self.active_task.and_then(|task| task.challenge)
    }
}

/// Stateless router; all inputs are passed per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseRouter;

impl ResponseRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn route(
        &self,
        intent: &IntentSignal,
        task: &TaskContext<'_>,
        gamification: &GamificationState,
    ) -> RoutingDecision {
        if intent.is_challenge_response {
            return decision(ResponseMode::ReflectiveDialogue, "reply to an issued challenge");
        }

        if !gamification.gamification_allowed {
            let suppressed = candidate_challenge(intent, task)
                .map(|kind| (kind, SuppressionReason::GamificationDisabled));
            if let Some((kind, _)) = suppressed {
                debug!(kind = %kind, "Challenge suppressed: gamification disallowed");
                return RoutingDecision {
                    mode: ResponseMode::ReflectiveDialogue,
                    reason: "gamification disallowed".to_string(),
                    suppressed,
                };
            }
            return fallback(intent, None);
        }

        let Some(kind) = candidate_challenge(intent, task) else {
            return fallback(intent, None);
        };

        let suppression = if gamification.is_on_cooldown(kind, task.turn_index) {
            Some(SuppressionReason::Cooldown)
        } else if gamification.variety_violated(kind) {
            Some(SuppressionReason::Variety)
        } else {
            None
        };

        if let Some(reason) = suppression {
            debug!(kind = %kind, ?reason, turn = task.turn_index, "Challenge suppressed");
            return fallback(intent, Some((kind, reason)));
        }

        if intent.is_help_seeking {
            debug!(kind = %kind, "Challenge deferred: help requested");
            return decision(ResponseMode::InformationalGuidance, "help requested");
        }

        let source = if intent.nominated_challenge().is_some() {
            "intent"
        } else {
            "activated task"
        };
        RoutingDecision {
            mode: ResponseMode::GamifiedChallenge(kind),
            reason: format!("{kind} challenge nominated by {source}"),
            suppressed: None,
        }
    }
}

/// Intent nominations win over the newly activated task's challenge.
fn candidate_challenge(intent: &IntentSignal, task: &TaskContext<'_>) -> Option<ChallengeKind> {
    intent.nominated_challenge().or_else(|| task.nominated_challenge())
}

fn decision(mode: ResponseMode, reason: &str) -> RoutingDecision {
    RoutingDecision {
        mode,
        reason: reason.to_string(),
        suppressed: None,
    }
}

fn fallback(
    intent: &IntentSignal,
    suppressed: Option<(ChallengeKind, SuppressionReason)>,
) -> RoutingDecision {
    let (mode, reason) = if intent.is_help_seeking {
        (ResponseMode::InformationalGuidance, "help requested")
    } else {
        (ResponseMode::ReflectiveDialogue, "default")
    };
    RoutingDecision {
        mode,
        reason: reason.to_string(),
        suppressed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{GamificationConfig, IntentFamily, Phase};

    fn signal(families: &[IntentFamily]) -> IntentSignal {
        let mut signal = IntentSignal::none();
        for family in families {
            signal.set(*family);
        }
        signal
    }

    fn gamification() -> GamificationState {
        GamificationState::new(GamificationConfig::default())
    }

    fn ctx(turn_index: u64) -> TaskContext<'static> {
        TaskContext {
            turn_index,
            active_task: None,
            newly_activated: false,
        }
    }

    fn task_with_challenge(kind: ChallengeKind) -> TaskDefinition {
        TaskDefinition {
            id: "visualization.spatial_analysis".to_string(),
            title: "Walk the plan".to_string(),
            phase: Phase::Visualization,
            min_percent: 25.0,
            max_percent: 55.0,
            prerequisites: vec![],
            trigger_once: true,
            challenge: Some(kind),
        }
    }

    #[test]
    fn test_default_is_reflective() {
        let decision = ResponseRouter::new().route(&IntentSignal::none(), &ctx(0), &gamification());
        assert_eq!(decision.mode, ResponseMode::ReflectiveDialogue);
        assert!(decision.suppressed.is_none());
    }

    #[test]
    fn test_help_seeking_gets_guidance() {
        let decision = ResponseRouter::new().route(
            &signal(&[IntentFamily::HelpSeeking]),
            &ctx(0),
            &gamification(),
        );
        assert_eq!(decision.mode, ResponseMode::InformationalGuidance);
    }

    #[test]
    fn test_transformation_gets_challenge() {
        let decision = ResponseRouter::new().route(
            &signal(&[IntentFamily::Transformation]),
            &ctx(0),
            &gamification(),
        );
        assert_eq!(
            decision.mode,
            ResponseMode::GamifiedChallenge(ChallengeKind::Transformation)
        );
    }

    #[test]
    fn test_challenge_response_never_gets_new_challenge() {
        let decision = ResponseRouter::new().route(
            &signal(&[IntentFamily::ChallengeResponse, IntentFamily::Transformation]),
            &ctx(0),
            &gamification(),
        );
        assert_eq!(decision.mode, ResponseMode::ReflectiveDialogue);
    }

    #[test]
    fn test_disallowed_forces_reflective_even_for_help() {
        let mut state = gamification();
        state.gamification_allowed = false;
        let decision = ResponseRouter::new().route(
            &signal(&[IntentFamily::Transformation, IntentFamily::HelpSeeking]),
            &ctx(0),
            &state,
        );
        assert_eq!(decision.mode, ResponseMode::ReflectiveDialogue);
        assert_eq!(
            decision.suppressed,
            Some((
                ChallengeKind::Transformation,
                SuppressionReason::GamificationDisabled
            ))
        );
    }

    #[test]
    fn test_cooldown_falls_back_by_help_seeking() {
        let mut state = gamification();
        state.record(ChallengeKind::Transformation, 4);
        state.record(ChallengeKind::RolePlay, 5);

        let router = ResponseRouter::new();
        let reflective = router.route(&signal(&[IntentFamily::Transformation]), &ctx(6), &state);
        assert_eq!(reflective.mode, ResponseMode::ReflectiveDialogue);
        assert_eq!(
            reflective.suppressed,
            Some((ChallengeKind::Transformation, SuppressionReason::Cooldown))
        );

        let guidance = router.route(
            &signal(&[IntentFamily::Transformation, IntentFamily::HelpSeeking]),
            &ctx(6),
            &state,
        );
        assert_eq!(guidance.mode, ResponseMode::InformationalGuidance);
    }

    #[test]
    fn test_help_request_outranks_transformation_challenge() {
        let classifier = crate::services::IntentClassifier::default();
        let intent = classifier.classify(
            "I need help: how do I convert this warehouse into a community center?",
            &[],
        );
        assert!(intent.is_help_seeking);
        assert!(intent.is_transformation_request);

        let decision = ResponseRouter::new().route(&intent, &ctx(0), &gamification());
        assert_eq!(decision.mode, ResponseMode::InformationalGuidance);
        assert!(decision.suppressed.is_none());
    }

    #[test]
    fn test_near_miss_option_marker_keeps_help_routing() {
        let classifier = crate::services::IntentClassifier::default();
        let intent = classifier.classify(
            "Is there an option available for daylight? Can you explain clerestories?",
            &[],
        );
        assert!(!intent.is_challenge_response);
        let decision = ResponseRouter::new().route(&intent, &ctx(0), &gamification());
        assert_eq!(decision.mode, ResponseMode::InformationalGuidance);
    }

    #[test]
    fn test_disallowed_without_candidate_reports_nothing() {
        let mut state = gamification();
        state.gamification_allowed = false;
        let decision = ResponseRouter::new().route(
            &signal(&[IntentFamily::HelpSeeking]),
            &ctx(0),
            &state,
        );
        assert_eq!(decision.mode, ResponseMode::InformationalGuidance);
        assert!(decision.suppressed.is_none());
    }

    #[test]
    fn test_variety_blocks_repeat_after_cooldown() {
        let mut state = gamification();
        state.record(ChallengeKind::Transformation, 0);
        let decision = ResponseRouter::new().route(
            &signal(&[IntentFamily::Transformation]),
            &ctx(50),
            &state,
        );
        assert_eq!(
            decision.suppressed,
            Some((ChallengeKind::Transformation, SuppressionReason::Variety))
        );
    }

    #[test]
    fn test_newly_activated_task_nominates_its_challenge() {
        let task = task_with_challenge(ChallengeKind::SpatialStorytelling);
        let context = TaskContext {
            turn_index: 3,
            active_task: Some(&task),
            newly_activated: true,
        };
        let decision = ResponseRouter::new().route(&IntentSignal::none(), &context, &gamification());
        assert_eq!(
            decision.mode,
            ResponseMode::GamifiedChallenge(ChallengeKind::SpatialStorytelling)
        );
    }

    #[test]
    fn test_older_active_task_does_not_nominate() {
        let task = task_with_challenge(ChallengeKind::SpatialStorytelling);
        let context = TaskContext {
            turn_index: 3,
            active_task: Some(&task),
            newly_activated: false,
        };
        let decision = ResponseRouter::new().route(&IntentSignal::none(), &context, &gamification());
        assert_eq!(decision.mode, ResponseMode::ReflectiveDialogue);
    }

    #[test]
    fn test_intent_outranks_task_nomination() {
        let task = task_with_challenge(ChallengeKind::SpatialStorytelling);
        let context = TaskContext {
            turn_index: 3,
            active_task: Some(&task),
            newly_activated: true,
        };
        let decision = ResponseRouter::new().route(
            &signal(&[IntentFamily::Perspective]),
            &context,
            &gamification(),
        );
        assert_eq!(decision.mode, ResponseMode::GamifiedChallenge(ChallengeKind::RolePlay));
    }
}
