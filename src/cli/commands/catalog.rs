//! Task catalog listing.

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::load_catalog;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::cli::table::{list_table, render_list};
use crate::domain::models::{Config, Phase, TaskDefinition};

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only show tasks of this phase (ideation, visualization, materialization)
    #[arg(short, long)]
    pub phase: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogOutput {
    pub tasks: Vec<TaskDefinition>,
    pub total: usize,
}

impl CommandOutput for CatalogOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "phase", "window", "prerequisites", "challenge", "once"]);
        for task in &self.tasks {
            table.add_row(vec![
                task.id.clone(),
                task.phase.to_string(),
                format!("{:.0}-{:.0}%", task.min_percent, task.max_percent),
                truncate(&task.prerequisites.join(", "), 40),
                task.challenge.map_or_else(|| "-".to_string(), |c| c.to_string()),
                if task.trigger_once { "yes" } else { "no" }.to_string(),
            ]);
        }
        render_list("task", &table, self.total)
    }
}

pub async fn execute(args: CatalogArgs, config: &Config, json_mode: bool) -> Result<()> {
    let phase = args
        .phase
        .as_deref()
        .map(|p| Phase::from_str(p).ok_or_else(|| anyhow!("Unknown phase: {p}")))
        .transpose()?;

    let catalog = load_catalog(config)?;
    let tasks: Vec<TaskDefinition> = catalog
        .iter()
        .filter(|t| phase.is_none_or(|p| t.phase == p))
        .cloned()
        .collect();

    let total = tasks.len();
    output(&CatalogOutput { tasks, total }, json_mode);
    Ok(())
}
