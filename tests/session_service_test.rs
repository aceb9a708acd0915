//! Integration tests for the multi-session service.

mod common;

use std::sync::Arc;

use atelier::{
    EngineConfig, EngineError, InMemorySessionRecorder, JsonlSessionRecorder, Phase,
    ResponseMode, SessionRecord, SessionRecorder, SessionService, TaskCatalog, TaskStatus,
};
use common::{step, temp_dir, WAREHOUSE};

fn service_with(recorder: Arc<dyn SessionRecorder>) -> SessionService {
    SessionService::new(
        Arc::new(TaskCatalog::builtin()),
        EngineConfig::default(),
        recorder,
    )
}

#[tokio::test]
async fn sessions_are_isolated() {
    let service = service_with(Arc::new(InMemorySessionRecorder::new()));
    let (a, _) = service.create_session().await;
    let (b, _) = service.create_session().await;

    service
        .on_turn(a, "site", Some(step("site_analysis", 1.0)))
        .await
        .unwrap();
    service.advance_phase(a, Phase::Visualization).await.unwrap();

    assert_eq!(service.current_phase(a).await.unwrap(), Phase::Visualization);
    assert_eq!(service.current_phase(b).await.unwrap(), Phase::Ideation);
    assert!(service.completion_percent(b, Phase::Ideation).await.unwrap().abs() < f64::EPSILON);
    assert_eq!(service.task_history(b).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_sessions_progress_independently() {
    let service = Arc::new(service_with(Arc::new(InMemorySessionRecorder::new())));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let (id, _) = service.create_session().await;
            let first = service.on_turn(id, WAREHOUSE, None).await.unwrap();
            let second = service
                .on_turn(id, "I think I'd keep the gantry", None)
                .await
                .unwrap();
            (first.response_mode, second.response_mode)
        }));
    }

    for handle in handles {
        let (first, second) = handle.await.unwrap();
        assert!(first.is_challenge());
        assert_eq!(second, ResponseMode::ReflectiveDialogue);
    }
    assert_eq!(service.session_count().await, 8);
}

#[tokio::test]
async fn turns_are_recorded_in_order() {
    let recorder = Arc::new(InMemorySessionRecorder::new());
    let service = service_with(recorder.clone());
    let (id, entry) = service.create_session().await;
    let entry = entry.unwrap();

    service
        .on_turn(id, "site", Some(step("site_analysis", 1.0)))
        .await
        .unwrap();

    let records = recorder.records_for(id).await.unwrap();
    assert!(matches!(
        &records[0],
        SessionRecord::TaskTransition { instance_id, to: TaskStatus::Active, .. } if *instance_id == entry.id
    ));
    let turns: Vec<u64> = records.iter().map(SessionRecord::turn).collect();
    let mut sorted = turns.clone();
    sorted.sort_unstable();
    assert_eq!(turns, sorted);
    assert!(records
        .iter()
        .any(|r| matches!(r, SessionRecord::ChallengeIssued { .. })));
}

#[tokio::test]
async fn jsonl_export_round_trips_session_records() {
    let dir = temp_dir();
    let path = dir.path().join("sessions.jsonl");
    let recorder = Arc::new(JsonlSessionRecorder::new(&path));
    let service = service_with(recorder.clone());

    let (id, _) = service.create_session().await;
    service.on_turn(id, WAREHOUSE, None).await.unwrap();
    service.advance_phase(id, Phase::Materialization).await.unwrap();

    let records = recorder.records_for(id).await.unwrap();
    assert!(records.iter().any(|r| matches!(
        r,
        SessionRecord::PhaseChanged { from: Phase::Ideation, to: Phase::Materialization, .. }
    )));
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), records.len());
}

#[tokio::test]
async fn closed_sessions_are_gone() {
    let service = service_with(Arc::new(InMemorySessionRecorder::new()));
    let (id, _) = service.create_session().await;
    service.close_session(id).await.unwrap();

    assert_eq!(
        service.active_task(id).await.unwrap_err(),
        EngineError::SessionNotFound(id)
    );
    assert!(matches!(
        service.advance_phase(id, Phase::Visualization).await,
        Err(EngineError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn gamification_toggle_is_per_session() {
    let service = service_with(Arc::new(InMemorySessionRecorder::new()));
    let (serious, _) = service.create_session().await;
    let (playful, _) = service.create_session().await;
    service.set_gamification_allowed(serious, false).await.unwrap();

    let a = service.on_turn(serious, WAREHOUSE, None).await.unwrap();
    let b = service.on_turn(playful, WAREHOUSE, None).await.unwrap();
    assert_eq!(a.response_mode, ResponseMode::ReflectiveDialogue);
    assert!(b.response_mode.is_challenge());
}
