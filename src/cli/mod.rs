//! Command-line interface.

pub mod commands;
pub mod output;
pub mod table;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::{Context, Result};

use crate::domain::models::Config;
use crate::services::TaskCatalog;

/// Built-in catalog, or the YAML catalog named by the configuration.
pub fn load_catalog(config: &Config) -> Result<TaskCatalog> {
    match &config.catalog_path {
        Some(path) => TaskCatalog::from_yaml_file(path)
            .with_context(|| format!("Failed to load task catalog from {}", path.display())),
        None => Ok(TaskCatalog::builtin()),
    }
}

/// Print the error in the requested format and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        let body = serde_json::json!({ "error": err.to_string(), "causes": chain });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
