//! Static task catalog.
//!
//! Task windows and prerequisites are data, not branching code: the built-in
//! table below is converted into validated `TaskDefinition`s, and an
//! alternative table can be loaded from YAML. A catalog is immutable once
//! built and is shared read-only across sessions.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::domain::error::{EngineError, EngineResult};
use crate::domain::models::{ChallengeKind, Phase, TaskDefinition};

struct CatalogEntry {
    id: &'static str,
    title: &'static str,
    phase: Phase,
    window: (f64, f64),
    prerequisites: &'static [&'static str],
    trigger_once: bool,
    challenge: Option<ChallengeKind>,
}

const BUILTIN_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "ideation.brainstorm",
        title: "Open brainstorm on site and program",
        phase: Phase::Ideation,
        window: (0.0, 15.0),
        prerequisites: &[],
        trigger_once: true,
        challenge: None,
    },
    CatalogEntry {
        id: "ideation.context_reflection",
        title: "Reflect on context through a neighbour's eyes",
        phase: Phase::Ideation,
        window: (20.0, 60.0),
        prerequisites: &["ideation.brainstorm"],
        trigger_once: true,
        challenge: Some(ChallengeKind::RolePlay),
    },
    CatalogEntry {
        id: "ideation.program_synthesis",
        title: "Synthesize the program into a concept statement",
        phase: Phase::Ideation,
        window: (60.0, 85.0),
        prerequisites: &["ideation.context_reflection"],
        trigger_once: true,
        challenge: None,
    },
    CatalogEntry {
        id: "visualization.sketch_kickoff",
        title: "First sketches of the spatial idea",
        phase: Phase::Visualization,
        window: (0.0, 15.0),
        prerequisites: &[],
        trigger_once: true,
        challenge: None,
    },
    CatalogEntry {
        id: "visualization.spatial_analysis",
        title: "Walk the plan as a sequence of spaces",
        phase: Phase::Visualization,
        window: (25.0, 55.0),
        prerequisites: &["visualization.sketch_kickoff"],
        trigger_once: true,
        challenge: Some(ChallengeKind::SpatialStorytelling),
    },
    CatalogEntry {
        id: "visualization.perspective_shift",
        title: "Test the layout from a visitor's perspective",
        phase: Phase::Visualization,
        window: (55.0, 80.0),
        prerequisites: &["visualization.spatial_analysis"],
        trigger_once: true,
        challenge: Some(ChallengeKind::RolePlay),
    },
    CatalogEntry {
        id: "materialization.material_briefing",
        title: "Material palette briefing",
        phase: Phase::Materialization,
        window: (0.0, 15.0),
        prerequisites: &[],
        trigger_once: true,
        challenge: None,
    },
    CatalogEntry {
        id: "materialization.tectonic_detailing",
        title: "Resolve a structural and envelope detail",
        phase: Phase::Materialization,
        window: (30.0, 65.0),
        prerequisites: &["materialization.material_briefing"],
        trigger_once: true,
        challenge: Some(ChallengeKind::ConstraintPuzzle),
    },
    CatalogEntry {
        id: "materialization.design_evolution",
        title: "Trace how the design evolved since ideation",
        phase: Phase::Materialization,
        window: (65.0, 90.0),
        prerequisites: &["materialization.tectonic_detailing"],
        trigger_once: true,
        challenge: Some(ChallengeKind::Transformation),
    },
];

impl From<&CatalogEntry> for TaskDefinition {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            title: entry.title.to_string(),
            phase: entry.phase,
            min_percent: entry.window.0,
            max_percent: entry.window.1,
            prerequisites: entry.prerequisites.iter().map(|p| (*p).to_string()).collect(),
            trigger_once: entry.trigger_once,
            challenge: entry.challenge,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tasks: Vec<TaskDefinition>,
}

/// Validated, immutable table of task definitions in declaration order.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    definitions: Vec<TaskDefinition>,
}

impl TaskCatalog {
    /// Build a catalog, rejecting inconsistent tables.
    pub fn new(definitions: Vec<TaskDefinition>) -> EngineResult<Self> {
        validate(&definitions)?;
        Ok(Self { definitions })
    }

    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            definitions: BUILTIN_CATALOG.iter().map(TaskDefinition::from).collect(),
        }
    }

    /// Parse a catalog from YAML of the form `tasks: [...]`.
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)
            .map_err(|e| EngineError::InvalidCatalog(format!("YAML parse error: {e}")))?;
        Self::new(file.tasks)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidCatalog(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn get(&self, id: &str) -> Option<&TaskDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Declaration index of a definition, used as the final tie-breaker.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.definitions.iter().position(|d| d.id == id)
    }

    /// Definitions owned by `phase`, in declaration order.
    pub fn for_phase(&self, phase: Phase) -> impl Iterator<Item = &TaskDefinition> {
        self.definitions.iter().filter(move |d| d.phase == phase)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate(definitions: &[TaskDefinition]) -> EngineResult<()> {
    let by_id = index_definitions(definitions)?;

    for def in definitions {
        let window_ok = def.min_percent.is_finite()
            && def.max_percent.is_finite()
            && def.min_percent >= 0.0
            && def.max_percent <= 100.0
            && def.min_percent <= def.max_percent;
        if !window_ok {
            return Err(EngineError::InvalidCatalog(format!(
                "task '{}' has invalid window [{}, {}]",
                def.id, def.min_percent, def.max_percent
            )));
        }

        for prereq in &def.prerequisites {
            let Some(required) = by_id.get(prereq.as_str()) else {
                return Err(EngineError::InvalidCatalog(format!(
                    "task '{}' requires unknown task '{prereq}'",
                    def.id
                )));
            };
            if required.phase > def.phase {
                return Err(EngineError::InvalidCatalog(format!(
                    "task '{}' requires '{prereq}' from the later {} phase",
                    def.id, required.phase
                )));
            }
        }
    }

    if let Some(cycle) = find_cycle(definitions, &by_id) {
        return Err(EngineError::InvalidCatalog(format!(
            "prerequisite cycle: {}",
            cycle.join(" -> ")
        )));
    }

    for (i, a) in definitions.iter().enumerate() {
        for b in &definitions[i + 1..] {
            if a.phase == b.phase
                && a.window_overlaps(b)
                && !depends_on(a, &b.id, &by_id)
                && !depends_on(b, &a.id, &by_id)
            {
                return Err(EngineError::InvalidCatalog(format!(
                    "tasks '{}' and '{}' have overlapping windows and no prerequisite ordering",
                    a.id, b.id
                )));
            }
        }
    }

    Ok(())
}

fn index_definitions(definitions: &[TaskDefinition]) -> EngineResult<HashMap<&str, &TaskDefinition>> {
    let mut by_id = HashMap::new();
    for def in definitions {
        if def.id.trim().is_empty() {
            return Err(EngineError::InvalidCatalog("task id cannot be empty".to_string()));
        }
        if by_id.insert(def.id.as_str(), def).is_some() {
            return Err(EngineError::InvalidCatalog(format!(
                "duplicate task id '{}'",
                def.id
            )));
        }
    }
    Ok(by_id)
}

/// Whether `def` requires `target`, directly or transitively.
fn depends_on(def: &TaskDefinition, target: &str, by_id: &HashMap<&str, &TaskDefinition>) -> bool {
    let mut stack: Vec<&str> = def.prerequisites.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    while let Some(id) = stack.pop() {
        if id == target {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        if let Some(next) = by_id.get(id) {
            stack.extend(next.prerequisites.iter().map(String::as_str));
        }
    }
    false
}

fn find_cycle(
    definitions: &[TaskDefinition],
    by_id: &HashMap<&str, &TaskDefinition>,
) -> Option<Vec<String>> {
    fn visit<'a>(
        id: &'a str,
        by_id: &HashMap<&str, &'a TaskDefinition>,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(start) = path.iter().position(|p| *p == id) {
            let mut cycle: Vec<String> = path[start..].iter().map(|s| (*s).to_string()).collect();
            cycle.push(id.to_string());
            return Some(cycle);
        }
        if !visited.insert(id) {
            return None;
        }
        path.push(id);
        if let Some(def) = by_id.get(id) {
            for prereq in &def.prerequisites {
                if let Some(cycle) = visit(prereq.as_str(), by_id, visited, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        None
    }

    let mut visited = HashSet::new();
    for def in definitions {
        let mut path = Vec::new();
        if let Some(cycle) = visit(def.id.as_str(), by_id, &mut visited, &mut path) {
            return Some(cycle);
        }
    }
    None
}
