//! Scripted session replay.
//!
//! Runs a YAML conversation script through a fresh session and prints the
//! per-turn routing. Script format:
//!
//! ```yaml
//! gamification_allowed: true
//! turns:
//!   - message: "I'd like to convert this warehouse into a community center"
//!     step: { step: site_analysis, passed: true, quality: 0.8 }
//!   - system: "What does the roof want to become?"
//!   - gamification_allowed: false
//!   - advance_phase: visualization
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adapters::{InMemorySessionRecorder, JsonlSessionRecorder};
use crate::cli::load_catalog;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::cli::table::list_table;
use crate::domain::models::{Config, Phase, StepResult, TaskInstance};
use crate::domain::ports::SessionRecorder;
use crate::services::SessionService;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// YAML script to replay
    pub script: PathBuf,

    /// Append session records to this JSON Lines file
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub gamification_allowed: Option<bool>,
    pub turns: Vec<ScriptStep>,
}

/// One scripted action. `message` and `step` together form a learner turn;
/// the other fields are applied before it, in declaration order.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    #[serde(default)]
    pub gamification_allowed: Option<bool>,
    #[serde(default)]
    pub advance_phase: Option<Phase>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub step: Option<StepResult>,
}

impl ReplayScript {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let script: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse script {}", path.display()))?;
        if script.turns.is_empty() {
            bail!("Script {} has no turns", path.display());
        }
        Ok(script)
    }
}

#[derive(Debug, Serialize)]
pub struct ReplayRow {
    pub turn: Option<u64>,
    pub phase: Phase,
    pub completion_percent: f64,
    pub event: String,
    pub mode: Option<String>,
    pub faults: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    pub session_id: Uuid,
    pub rows: Vec<ReplayRow>,
    pub history: Vec<TaskInstance>,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<PathBuf>,
}

impl CommandOutput for ReplayOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["turn", "phase", "done", "event", "mode"]);
        for row in &self.rows {
            let mut event = row.event.clone();
            for fault in &row.faults {
                event.push_str(&format!("\n! {}", truncate(fault, 60)));
            }
            table.add_row(vec![
                row.turn.map_or_else(|| "-".to_string(), |t| t.to_string()),
                row.phase.to_string(),
                format!("{:.1}%", row.completion_percent),
                event,
                row.mode.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }

        let mut lines = vec![format!("Session {}", self.session_id), table.to_string()];
        lines.push(format!("\nTask history ({}):", self.history.len()));
        for task in &self.history {
            lines.push(format!(
                "  {:<40} {:<10} activated@{:<4} {}",
                task.definition_id,
                task.status.to_string(),
                task.activated_turn.map_or_else(|| "-".to_string(), |t| t.to_string()),
                task.completed_turn
                    .map_or_else(String::new, |t| format!("completed@{t}")),
            ));
        }
        lines.push(format!("\n{} session record(s)", self.records));
        if let Some(path) = &self.export {
            lines.push(format!("Exported to {}", path.display()));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ReplayArgs, config: &Config, json_mode: bool) -> Result<()> {
    let script = ReplayScript::from_yaml_file(&args.script)?;
    let catalog = Arc::new(load_catalog(config)?);

    let recorder: Arc<dyn SessionRecorder> = match &args.export {
        Some(path) => Arc::new(JsonlSessionRecorder::new(path)),
        None => Arc::new(InMemorySessionRecorder::new()),
    };

    let service = SessionService::new(catalog, config.engine.clone(), recorder.clone());
    let result = run_script(&service, &script).await?;
    let records = recorder.records_for(result.session_id).await?.len();

    output(
        &ReplayOutput {
            records,
            export: args.export,
            ..result
        },
        json_mode,
    );
    Ok(())
}

/// Drive one session through the script.
pub async fn run_script(service: &SessionService, script: &ReplayScript) -> Result<ReplayOutput> {
    let (session_id, entry) = service.create_session().await;
    let mut rows = Vec::new();

    if let Some(allowed) = script.gamification_allowed {
        service.set_gamification_allowed(session_id, allowed).await?;
    }
    if let Some(task) = entry {
        rows.push(ReplayRow {
            turn: None,
            phase: task.phase,
            completion_percent: 0.0,
            event: format!("entry task {}", task.definition_id),
            mode: None,
            faults: vec![],
        });
    }

    for step in &script.turns {
        if let Some(allowed) = step.gamification_allowed {
            service.set_gamification_allowed(session_id, allowed).await?;
        }
        if let Some(next) = step.advance_phase {
            let advance = service.advance_phase(session_id, next).await?;
            let mut event = format!("advanced {} -> {}", advance.reset.from, advance.reset.to);
            if let Some(task) = &advance.activated_task {
                event.push_str(&format!("; activated {}", task.definition_id));
            }
            rows.push(ReplayRow {
                turn: None,
                phase: next,
                completion_percent: advance.reset.frozen.completion_percent,
                event,
                mode: None,
                faults: advance.fault.into_iter().collect(),
            });
        }
        if let Some(text) = &step.system {
            service.record_system_turn(session_id, text).await?;
        }
        if step.message.is_none() && step.step.is_none() {
            continue;
        }

        let message = step.message.as_deref().unwrap_or_default();
        let outcome = service
            .on_turn(session_id, message, step.step.clone())
            .await?;

        let mut events = Vec::new();
        for done in &outcome.auto_completed {
            events.push(format!("auto-completed {}", done.definition_id));
        }
        if let Some(task) = &outcome.activated_task {
            let late = if outcome.late_recovery { " (late)" } else { "" };
            events.push(format!("activated {}{late}", task.definition_id));
        }
        if events.is_empty() {
            events.push(truncate(message, 40));
        }

        rows.push(ReplayRow {
            turn: Some(outcome.turn_index),
            phase: outcome.phase,
            completion_percent: outcome.completion_percent,
            event: events.join("; "),
            mode: Some(outcome.response_mode.to_string()),
            faults: outcome.faults,
        });
    }

    let history = service.task_history(session_id).await?.iter().cloned().collect();
    service.close_session(session_id).await?;

    Ok(ReplayOutput {
        session_id,
        rows,
        history,
        records: 0,
        export: None,
    })
}
