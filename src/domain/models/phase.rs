//! Design process phases.
//!
//! A session walks through a fixed, ordered sequence of phases. Each phase
//! names the checkpoint steps whose completion drives its completion percent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three ordered macro-stages of the design process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Concept generation: site, program, precedents.
    Ideation,
    /// Spatial exploration through sketches and diagrams.
    Visualization,
    /// Materials, structure, and detailing.
    Materialization,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Ideation
    }
}

const IDEATION_STEPS: &[&str] = &[
    "site_analysis",
    "program_definition",
    "precedent_study",
    "concept_statement",
];

const VISUALIZATION_STEPS: &[&str] = &[
    "spatial_layout",
    "massing_study",
    "circulation_diagram",
    "sketch_review",
];

const MATERIALIZATION_STEPS: &[&str] = &[
    "material_selection",
    "structural_system",
    "detail_development",
    "final_presentation",
];

impl Phase {
    /// All phases in process order.
    pub const ALL: [Self; 3] = [Self::Ideation, Self::Visualization, Self::Materialization];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ideation => "ideation",
            Self::Visualization => "visualization",
            Self::Materialization => "materialization",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ideation" => Some(Self::Ideation),
            "visualization" | "visualisation" => Some(Self::Visualization),
            "materialization" | "materialisation" => Some(Self::Materialization),
            _ => None,
        }
    }

    /// Zero-based position in the process.
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Ideation => 0,
            Self::Visualization => 1,
            Self::Materialization => 2,
        }
    }

    /// The phase that follows this one, if any.
    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.ordinal() + 1).copied()
    }

    /// Checkpoint steps a learner is expected to complete in this phase.
    pub fn required_steps(&self) -> &'static [&'static str] {
        match self {
            Self::Ideation => IDEATION_STEPS,
            Self::Visualization => VISUALIZATION_STEPS,
            Self::Materialization => MATERIALIZATION_STEPS,
        }
    }

    /// Whether moving from `self` to `target` is a forward move.
    pub fn can_advance_to(&self, target: Self) -> bool {
        target.ordinal() > self.ordinal()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
