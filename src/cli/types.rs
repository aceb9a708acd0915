//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::{CatalogArgs, ClassifyArgs, ReplayArgs};

#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(about = "Atelier - phase-task progression and response routing", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file to use instead of .atelier/config.yaml
    #[arg(short, long, global = true, env = "ATELIER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List task definitions in the catalog
    Catalog(CatalogArgs),

    /// Classify a learner message and show the routing it would get
    Classify(ClassifyArgs),

    /// Run a scripted session through the engine
    Replay(ReplayArgs),
}
