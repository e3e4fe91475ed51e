//! Scenario runner - executes preset scenarios and checks their outcome.

use crate::scenarios::ScenarioId;
use crate::summary::RunSummary;
use crate::world::SimWorld;

use tracing::{debug, info};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the run met its termination condition within budget
    pub passed: bool,

    /// Steps executed
    pub total_steps: u64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Full run summary (absent if the world could not be built)
    pub summary: Option<RunSummary>,
}

/// Runs preset scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Step budget per run
    max_steps: u64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_steps: 10_000,
        }
    }

    /// Sets the step budget.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        let mut config = scenario.config(self.seed);
        config.max_steps = self.max_steps;

        let mut world = match SimWorld::new(config) {
            Ok(world) => world,
            Err(e) => {
                return ScenarioResult {
                    scenario,
                    seed: self.seed,
                    passed: false,
                    total_steps: 0,
                    failure_reason: Some(e.to_string()),
                    summary: None,
                };
            }
        };

        let finished = world.run();
        let summary = world.summary(false);

        let failure_reason = if !finished {
            Some(format!(
                "not finished after {} steps ({}/{} nodes visited)",
                summary.steps, summary.visited_count, summary.node_count
            ))
        } else if scenario != ScenarioId::CycleDispersion && summary.visited_count < summary.node_count {
            Some(format!(
                "stopped with {}/{} nodes visited",
                summary.visited_count, summary.node_count
            ))
        } else {
            None
        };

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            total_steps: summary.steps,
            failure_reason,
            summary: Some(summary),
        }
    }
}
