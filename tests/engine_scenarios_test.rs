//! End-to-end scenarios for the phase-task engine.

mod common;

use std::sync::Arc;

use atelier::domain::models::TaskHistory;
use atelier::{
    ChallengeKind, CompletionReason, EngineConfig, Phase, ResponseMode, TaskCatalog,
    TaskLifecycle, TaskStatus, TriggerResolver,
};
use common::{engine, engine_with, setup_test_logging, step, WAREHOUSE};

fn builtin_resolver(threshold: f64) -> TriggerResolver {
    TriggerResolver::new(Arc::new(TaskCatalog::builtin()), threshold)
}

#[test]
fn entry_task_fires_at_zero_percent() {
    setup_test_logging();
    let mut engine = engine();

    let outcome = engine.on_turn("Hi, I'm starting a library project", None);

    assert!(outcome.completion_percent.abs() < f64::EPSILON);
    let task = outcome.activated_task.expect("entry task should fire");
    assert_eq!(task.definition_id, "ideation.brainstorm");
    assert_eq!(task.status, TaskStatus::Active);
    assert!(!outcome.late_recovery);
}

#[test]
fn in_window_task_activates_once_prerequisite_is_done() {
    let resolver = builtin_resolver(80.0);
    let catalog = resolver.catalog();
    let mut lifecycle = TaskLifecycle::new();

    let brainstorm = lifecycle
        .activate(catalog.get("ideation.brainstorm").unwrap(), 0)
        .unwrap();
    lifecycle
        .complete(brainstorm.id, CompletionReason::LearnerAction, 1)
        .unwrap();

    let resolution = resolver
        .resolve(Phase::Ideation, 52.0, lifecycle.history())
        .expect("a task should be due at 52%");
    assert_eq!(resolution.definition.id, "ideation.context_reflection");
    assert!(!resolution.late_recovery);
}

#[test]
fn in_window_task_waits_for_incomplete_prerequisite() {
    let resolver = builtin_resolver(80.0);
    assert!(resolver
        .resolve(Phase::Ideation, 52.0, &TaskHistory::new())
        .is_none());
}

#[test]
fn skipped_window_is_recovered_exactly_once() {
    let resolver = builtin_resolver(80.0);
    let catalog = resolver.catalog();
    let mut lifecycle = TaskLifecycle::new();

    // Entry task fired and finished at 15%.
    let brainstorm = lifecycle
        .activate(catalog.get("ideation.brainstorm").unwrap(), 0)
        .unwrap();
    lifecycle
        .complete(brainstorm.id, CompletionReason::LearnerAction, 1)
        .unwrap();
    assert!(resolver
        .resolve(Phase::Ideation, 15.0, lifecycle.history())
        .is_none());

    // Completion jumps straight to 85%.
    let resolution = resolver
        .resolve(Phase::Ideation, 85.0, lifecycle.history())
        .expect("missed window should be recovered");
    assert_eq!(resolution.definition.id, "ideation.context_reflection");
    assert!(resolution.late_recovery);
    let definition = resolution.definition.clone();
    lifecycle.activate(&definition, 2).unwrap();

    // Later passes never activate it again.
    for _ in 0..3 {
        if let Some(next) = resolver.resolve(Phase::Ideation, 85.0, lifecycle.history()) {
            assert_ne!(next.definition.id, "ideation.context_reflection");
        }
    }
    let fired = lifecycle
        .history()
        .iter()
        .filter(|i| i.definition_id == "ideation.context_reflection")
        .count();
    assert_eq!(fired, 1);
}

#[test]
fn below_threshold_missed_windows_stay_missed() {
    let resolver = builtin_resolver(90.0);
    let catalog = resolver.catalog();
    let mut lifecycle = TaskLifecycle::new();
    let brainstorm = lifecycle
        .activate(catalog.get("ideation.brainstorm").unwrap(), 0)
        .unwrap();
    lifecycle
        .complete(brainstorm.id, CompletionReason::LearnerAction, 1)
        .unwrap();

    assert!(resolver
        .resolve(Phase::Ideation, 86.0, lifecycle.history())
        .is_none());
}

#[test]
fn engine_recovers_a_window_skipped_between_turns() {
    let catalog = TaskCatalog::from_yaml_str(
        r"
tasks:
  - id: ideation.intro
    title: Introduce the brief
    phase: ideation
    min_percent: 0
    max_percent: 10
  - id: ideation.reflect
    title: Reflect on the site
    phase: ideation
    min_percent: 20
    max_percent: 30
    prerequisites: [ideation.intro]
    challenge: role_play
",
    )
    .unwrap();
    let config = EngineConfig {
        late_trigger_threshold: 45.0,
        ..EngineConfig::default()
    };
    let mut engine = engine_with(catalog, &config);
    engine.begin();

    // 17.5%: between the two windows.
    let first = engine.on_turn("Here's my site analysis", Some(&step("site_analysis", 0.0)));
    assert!((first.completion_percent - 17.5).abs() < 1e-9);
    assert!(first.activated_task.is_none());

    // 50%: the [20, 30] window was jumped over.
    let second = engine.on_turn(
        "And the program",
        Some(&step("program_definition", 1.0)),
    );
    assert!((second.completion_percent - 50.0).abs() < 1e-9);
    let recovered = second.activated_task.expect("skipped task should be recovered");
    assert_eq!(recovered.definition_id, "ideation.reflect");
    assert!(second.late_recovery);
    assert_eq!(second.auto_completed.len(), 1);
    assert_eq!(second.auto_completed[0].definition_id, "ideation.intro");
    assert!(matches!(
        second.auto_completed[0].completion_reason,
        Some(CompletionReason::SuccessorEligible { ref successor }) if successor == "ideation.reflect"
    ));

    let third = engine.on_turn("more notes", Some(&step("precedent_study", 1.0)));
    assert!(third.activated_task.is_none());
}

#[test]
fn progression_through_ideation_auto_completes_predecessors() {
    let mut engine = engine();
    engine.begin();

    let turn = engine.on_turn("Site notes attached", Some(&step("site_analysis", 1.0)));
    assert!((turn.completion_percent - 47.5).abs() < 1e-9);
    assert_eq!(
        turn.activated_task.unwrap().definition_id,
        "ideation.context_reflection"
    );
    // The new task nominates its role-play challenge.
    assert_eq!(
        turn.response_mode,
        ResponseMode::GamifiedChallenge(ChallengeKind::RolePlay)
    );

    let turn = engine.on_turn("Program drafted", Some(&step("program_definition", 1.0)));
    assert!((turn.completion_percent - 65.0).abs() < 1e-9);
    assert_eq!(
        turn.activated_task.unwrap().definition_id,
        "ideation.program_synthesis"
    );

    let history = engine.get_task_history();
    let completed: Vec<&str> = history
        .iter()
        .filter(|i| i.status == TaskStatus::Completed)
        .map(|i| i.definition_id.as_str())
        .collect();
    assert_eq!(completed, vec!["ideation.brainstorm", "ideation.context_reflection"]);
    assert_eq!(
        engine.get_active_task().unwrap().definition_id,
        "ideation.program_synthesis"
    );
}

#[test]
fn completion_never_decreases_within_a_phase() {
    let mut engine = engine();
    engine.begin();
    let high = engine
        .on_turn("good", Some(&step("site_analysis", 1.0)))
        .completion_percent;
    let after = engine
        .on_turn("weak exchange", Some(&atelier::StepResult::exchange(0.0)))
        .completion_percent;
    assert!(after >= high);
}

#[test]
fn warehouse_request_gets_challenge_then_reflection() {
    let mut engine = engine();
    engine.begin();

    let first = engine.on_turn(WAREHOUSE, None);
    assert!(first.intent_signal.is_transformation_request);
    assert_eq!(
        first.response_mode,
        ResponseMode::GamifiedChallenge(ChallengeKind::Transformation)
    );

    let reply = engine.on_turn(
        "I think I'd turn the loading bay into a covered market",
        None,
    );
    assert!(reply.intent_signal.is_challenge_response);
    assert_eq!(reply.response_mode, ResponseMode::ReflectiveDialogue);
}

#[test]
fn disallowed_gamification_forces_reflective_dialogue() {
    let mut engine = engine();
    engine.begin();
    engine.set_gamification_allowed(false);

    let outcome = engine.on_turn(WAREHOUSE, None);
    assert!(outcome.intent_signal.is_transformation_request);
    assert_eq!(outcome.response_mode, ResponseMode::ReflectiveDialogue);

    let help = engine.on_turn(
        "Can you explain how to transform a warehouse into a community center at this scale?",
        None,
    );
    assert!(help.intent_signal.is_help_seeking);
    assert_eq!(help.response_mode, ResponseMode::ReflectiveDialogue);
}

#[test]
fn repeated_transformation_requests_respect_cooldown_and_variety() {
    let mut engine = engine();
    engine.begin();

    let first = engine.on_turn(WAREHOUSE, None);
    assert!(first.response_mode.is_challenge());

    let mut later_challenges = 0;
    for _ in 0..6 {
        if engine.on_turn(WAREHOUSE, None).response_mode.is_challenge() {
            later_challenges += 1;
        }
    }
    // Same kind twice in a row is never allowed.
    assert_eq!(later_challenges, 0);
}

#[test]
fn phase_advance_freezes_and_resets_completion() {
    let mut engine = engine();
    engine.begin();
    engine.on_turn("site", Some(&step("site_analysis", 1.0)));

    let advance = engine.advance_phase(Phase::Visualization).unwrap();
    assert!((advance.reset.frozen.completion_percent - 47.5).abs() < 1e-9);
    assert!(advance.reset.frozen.frozen);
    assert!(advance
        .auto_completed
        .iter()
        .all(|t| t.completion_reason
            == Some(CompletionReason::PhaseAdvanced {
                to: Phase::Visualization
            })));
    assert_eq!(
        advance.activated_task.unwrap().definition_id,
        "visualization.sketch_kickoff"
    );

    assert!(engine.get_completion_percent(Phase::Visualization).abs() < f64::EPSILON);
    assert!((engine.get_completion_percent(Phase::Ideation) - 47.5).abs() < 1e-9);

    // Evidence for the left phase no longer counts.
    let outcome = engine.on_turn("late ideation work", Some(&step("precedent_study", 1.0)));
    assert_eq!(outcome.faults.len(), 1);
    assert!((engine.get_completion_percent(Phase::Ideation) - 47.5).abs() < 1e-9);
}

#[test]
fn backward_or_same_phase_advance_is_rejected() {
    let mut engine = engine();
    engine.begin();
    assert!(engine.advance_phase(Phase::Ideation).is_err());
    engine.advance_phase(Phase::Materialization).unwrap();
    assert!(engine.advance_phase(Phase::Visualization).is_err());
    assert_eq!(engine.current_phase(), Phase::Materialization);
}

#[test]
fn explicit_completion_of_unknown_instance_fails() {
    let mut engine = engine();
    engine.begin();
    assert!(engine.complete_task(uuid::Uuid::new_v4()).is_err());

    let active = engine.get_active_task().unwrap().id;
    let done = engine.complete_task(active).unwrap();
    assert_eq!(done.completion_reason, Some(CompletionReason::LearnerAction));
    assert!(engine.complete_task(active).is_err());
}
