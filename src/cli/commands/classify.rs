//! One-off message classification.

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{ChallengeKind, Config, ConversationTurn, IntentSignal, RoutingDecision};
use crate::services::{GamificationState, IntentClassifier, ResponseRouter, TaskContext};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Learner message to classify
    pub message: String,

    /// Treat a challenge of this kind as pending (e.g. transformation, role_play)
    #[arg(short, long)]
    pub pending: Option<String>,

    /// Route as if gamification were disallowed for the session
    #[arg(long)]
    pub no_gamification: bool,
}

#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub message: String,
    pub signal: IntentSignal,
    pub routing: RoutingDecision,
}

impl CommandOutput for ClassifyOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Mode:   {}", self.routing.mode)];
        lines.push(format!("Reason: {}", self.routing.reason));
        if let Some((kind, why)) = &self.routing.suppressed {
            lines.push(format!("Suppressed: {kind} ({why:?})"));
        }
        if self.signal.is_empty() {
            lines.push("No intent families matched.".to_string());
        } else {
            lines.push("Matched:".to_string());
            for found in &self.signal.matches {
                let strength = if found.strong { " (strong marker)" } else { "" };
                lines.push(format!(
                    "  {:?}{strength}: {}",
                    found.family,
                    found.phrases.join(", ")
                ));
            }
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ClassifyArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut history = Vec::new();
    if let Some(kind) = args.pending.as_deref() {
        let kind = ChallengeKind::from_str(kind).ok_or_else(|| anyhow!("Unknown challenge kind: {kind}"))?;
        history.push(ConversationTurn::system(kind.marker()));
    }

    let classifier = IntentClassifier::new(config.engine.history_window);
    let signal = classifier.classify(&args.message, &history);

    let mut gamification = GamificationState::new(config.engine.gamification);
    if args.no_gamification {
        gamification.gamification_allowed = false;
    }
    let routing = ResponseRouter::new().route(&signal, &TaskContext::default(), &gamification);

    output(
        &ClassifyOutput {
            message: args.message,
            signal,
            routing,
        },
        json_mode,
    );
    Ok(())
}
