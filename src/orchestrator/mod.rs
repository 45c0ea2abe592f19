//! Ordered Create/Start passes over a daemon gateway.
//!
//! The orchestrator walks an [`OrderedPlan`] strictly in order, one container
//! at a time. Each container is inspected, classified by a pure decision
//! function, and then acted on. The first fatal error halts the run; nothing
//! after the failing container is touched.

mod decide;
mod outcome;
mod translate;

#[cfg(test)]
mod run_tests;

pub use decide::{decide, decide_create, decide_start, verify_image, Step};
pub use outcome::{ContainerOutcome, Phase, ProvisionResult, RunReport, RunSummary};
pub use translate::{create_options, runtime_options};

use crate::container::ContainerSpec;
use crate::daemon::DaemonGateway;
use crate::error::Result;
use crate::graph::OrderedPlan;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Options applying to a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Inspect and classify only; never create or start.
    pub dry_run: bool,
}

/// Whether a container exists and runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Missing,
    Stopped,
    Running,
}

/// Read-only view of one container, as reported by `survey`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerStatus {
    pub name: String,
    pub image: String,
    pub presence: Presence,
    /// `None` when the container does not exist.
    pub image_matches: Option<bool>,
}

/// Drives containers through the Create and Start phases.
pub struct Orchestrator {
    gateway: Arc<dyn DaemonGateway>,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn DaemonGateway>, options: RunOptions) -> Self {
        Self { gateway, options }
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Runs `phase` over `specs` in plan order.
    ///
    /// Never returns an error directly; the fatal error, if any, is carried
    /// in the report together with the outcomes recorded before it.
    pub async fn run(&self, specs: &[ContainerSpec], plan: &OrderedPlan, phase: Phase) -> RunReport {
        let mut report = RunReport::new(phase, specs.len());

        info!(
            phase = %phase,
            gateway = self.gateway.name(),
            dry_run = self.options.dry_run,
            containers = specs.len(),
            "Starting run"
        );

        for index in plan.iter() {
            let spec = &specs[index];
            match self.provision(spec, phase).await {
                Ok(result) => report.record(&spec.name, result, self.options.dry_run),
                Err(e) => {
                    error!(container = %spec.name, phase = %phase, error = %e, "Run halted");
                    report.fail(&spec.name, e);
                    break;
                }
            }
        }

        if report.is_success() {
            match phase {
                Phase::Create => info!("Finished creating containers"),
                Phase::Start => info!("Finished starting containers"),
            }
        }
        info!(phase = %phase, "{}", report.summary);

        report
    }

    /// Inspects, decides and acts for a single container.
    async fn provision(&self, spec: &ContainerSpec, phase: Phase) -> Result<ProvisionResult> {
        let existing = self.gateway.inspect_container(&spec.name).await?;
        let image = match existing {
            Some(_) => self.gateway.inspect_image(&spec.image).await?,
            None => None,
        };

        let step = decide(phase, spec, existing.as_ref(), image.as_ref())?;
        debug!(container = %spec.name, step = ?step, "Decided");

        match step {
            Step::Create => {
                info!(container = %spec.name, image = %spec.image, "Container not found, creating...");
                if !self.options.dry_run {
                    self.gateway.create_container(&create_options(spec)).await?;
                    info!(container = %spec.name, "Created container");
                }
                Ok(ProvisionResult::Created)
            }
            Step::SkipExisting => {
                info!(container = %spec.name, "Container exists, skipping...");
                Ok(ProvisionResult::SkippedAlreadyExists)
            }
            Step::Start => {
                info!(container = %spec.name, "Starting container...");
                if !self.options.dry_run {
                    self.gateway
                        .start_container(&spec.name, &runtime_options(spec))
                        .await?;
                    info!(container = %spec.name, "Started container");
                }
                Ok(ProvisionResult::Started)
            }
            Step::SkipRunning => {
                info!(container = %spec.name, "Container is already running, skipping...");
                Ok(ProvisionResult::SkippedAlreadyRunning)
            }
        }
    }

    /// Reports the state of every container in plan order without changing
    /// anything.
    pub async fn survey(
        &self,
        specs: &[ContainerSpec],
        plan: &OrderedPlan,
    ) -> Result<Vec<ContainerStatus>> {
        let mut statuses = Vec::with_capacity(plan.len());

        for index in plan.iter() {
            let spec = &specs[index];
            let status = match self.gateway.inspect_container(&spec.name).await? {
                None => ContainerStatus {
                    name: spec.name.clone(),
                    image: spec.image.clone(),
                    presence: Presence::Missing,
                    image_matches: None,
                },
                Some(state) => {
                    let image = self.gateway.inspect_image(&spec.image).await?;
                    ContainerStatus {
                        name: spec.name.clone(),
                        image: spec.image.clone(),
                        presence: if state.running {
                            Presence::Running
                        } else {
                            Presence::Stopped
                        },
                        image_matches: Some(verify_image(spec, &state, image.as_ref()).is_ok()),
                    }
                }
            };
            statuses.push(status);
        }

        Ok(statuses)
    }
}
