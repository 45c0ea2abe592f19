//! Per-container outcomes and run-level accounting.

use crate::error::{JunbanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two provisioning passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Create every container that does not exist yet.
    Create,
    /// Start every created container that is not running.
    Start,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Create => write!(f, "create"),
            Phase::Start => write!(f, "start"),
        }
    }
}

/// Outcome for a single container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum ProvisionResult {
    Created,
    SkippedAlreadyExists,
    Started,
    SkippedAlreadyRunning,
    Failed(String),
}

impl ProvisionResult {
    /// Returns true for the idempotent skip outcomes.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            ProvisionResult::SkippedAlreadyExists | ProvisionResult::SkippedAlreadyRunning
        )
    }
}

impl fmt::Display for ProvisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionResult::Created => write!(f, "created"),
            ProvisionResult::SkippedAlreadyExists => write!(f, "skipped (already exists)"),
            ProvisionResult::Started => write!(f, "started"),
            ProvisionResult::SkippedAlreadyRunning => write!(f, "skipped (already running)"),
            ProvisionResult::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Outcome for a named container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerOutcome {
    pub name: String,
    #[serde(flatten)]
    pub result: ProvisionResult,
    /// The action was only planned, not performed.
    pub dry_run: bool,
}

/// Counts per outcome category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub phase: Phase,
    /// Number of containers in the configuration.
    pub total: usize,
    pub created: usize,
    pub started: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn new(phase: Phase, total: usize) -> Self {
        Self {
            phase,
            total,
            created: 0,
            started: 0,
            skipped: 0,
            failed: 0,
        }
    }

    fn record(&mut self, result: &ProvisionResult) {
        match result {
            ProvisionResult::Created => self.created += 1,
            ProvisionResult::Started => self.started += 1,
            ProvisionResult::SkippedAlreadyExists | ProvisionResult::SkippedAlreadyRunning => {
                self.skipped += 1
            }
            ProvisionResult::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (done, verb) = match self.phase {
            Phase::Create => (self.created, "created"),
            Phase::Start => (self.started, "started"),
        };
        write!(
            f,
            "Total: {} ({} {} / {} skipped",
            self.total, done, verb, self.skipped
        )?;
        if self.failed > 0 {
            write!(f, " / {} failed", self.failed)?;
        }
        write!(f, ")")
    }
}

/// Everything a run produced: outcomes in plan order, counts, and the fatal
/// error that stopped it, if any.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<ContainerOutcome>,
    pub summary: RunSummary,
    pub error: Option<JunbanError>,
}

impl RunReport {
    pub fn new(phase: Phase, total: usize) -> Self {
        Self {
            outcomes: Vec::new(),
            summary: RunSummary::new(phase, total),
            error: None,
        }
    }

    /// Records a successful or skipped container.
    pub fn record(&mut self, name: &str, result: ProvisionResult, dry_run: bool) {
        self.summary.record(&result);
        self.outcomes.push(ContainerOutcome {
            name: name.to_string(),
            result,
            dry_run,
        });
    }

    /// Records the fatal error that halts the run.
    pub fn fail(&mut self, name: &str, error: JunbanError) {
        self.record(name, ProvisionResult::Failed(error.to_string()), false);
        self.error = Some(error);
    }

    /// Returns true if every container in the plan was processed.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Outcome for `name`, if it was processed.
    pub fn outcome(&self, name: &str) -> Option<&ProvisionResult> {
        self.outcomes
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.result)
    }

    /// Converts the report into its summary, or the error that halted it.
    pub fn into_result(self) -> Result<RunSummary> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.summary),
        }
    }
}
