//! SimWorld - builds a graph and coordinator from a [`SimConfig`] and drives it.

use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::SimError;
use crate::summary::{RobotSummary, RunSummary};

use dynagraph_core::{Coordinator, Graph, GraphSnapshot, Robot};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// The SimWorld - container for one configured simulation.
pub struct SimWorld {
    /// Configuration
    config: SimConfig,

    /// Seed context the RNG streams came from
    context: SimContext,

    /// The coordinator being driven
    coordinator: Coordinator<ChaCha8Rng>,
}

impl SimWorld {
    /// Validates the config, generates the graph and creates the coordinator.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        if config.tree_strategy_on_non_tree() {
            warn!(
                "{} assumes a tree but {} graphs may contain cycles",
                config.strategy, config.graph_kind
            );
        }
        let context = SimContext::new(config.seed);

        let graph = config.generator_config().generate(&mut context.graph_rng())?;
        debug!(
            "Generated {} graph: {} nodes, {} edge entries, connected={}",
            config.graph_kind,
            graph.node_count(),
            graph.edge_count(),
            graph.is_connected()
        );

        let coordinator = Coordinator::new(
            graph,
            config.strategy,
            config.coordinator_config(),
            context.movement_rng(),
        )?;

        Ok(Self {
            config,
            context,
            coordinator,
        })
    }

    /// Advances the simulation by one step.
    pub fn step(&mut self) {
        self.coordinator.step();
    }

    /// Runs until finished or the configured step budget is spent.
    ///
    /// Returns true if the run finished.
    pub fn run(&mut self) -> bool {
        info!(
            "Running {} on {} (seed={}, budget={} steps)",
            self.config.strategy, self.config.graph_kind, self.context.seed(), self.config.max_steps
        );
        self.coordinator.run_for(self.config.max_steps)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the coordinator.
    pub fn coordinator(&self) -> &Coordinator<ChaCha8Rng> {
        &self.coordinator
    }

    /// Returns the live graph.
    pub fn graph(&self) -> &Graph {
        self.coordinator.graph()
    }

    /// Returns every robot.
    pub fn robots(&self) -> &[Robot] {
        self.coordinator.robots()
    }

    /// Returns the per-node visited flags.
    pub fn visited_nodes(&self) -> &[bool] {
        self.coordinator.visited_nodes()
    }

    /// Returns the current step number.
    pub fn step_number(&self) -> u64 {
        self.coordinator.step_number()
    }

    /// Returns the snapshots taken before each reshuffle.
    pub fn graph_history(&self) -> &[GraphSnapshot] {
        self.coordinator.graph_history()
    }

    /// Returns true once the strategy's termination condition holds.
    pub fn is_finished(&self) -> bool {
        self.coordinator.is_finished()
    }

    /// Summarizes the current state, optionally with every robot's trace.
    pub fn summary(&self, include_robots: bool) -> RunSummary {
        let coordinator = &self.coordinator;
        let robots = if include_robots {
            coordinator
                .robots()
                .iter()
                .map(|robot| RobotSummary {
                    id: robot.id(),
                    start_node: robot.start_node(),
                    current_node: robot.current_node(),
                    active: robot.is_active(),
                    ports_traversed: robot.ports_traversed(),
                })
                .collect()
        } else {
            Vec::new()
        };

        RunSummary {
            seed: self.context.seed(),
            graph_kind: self.config.graph_kind,
            strategy: self.config.strategy,
            node_count: coordinator.graph().node_count(),
            edge_count: coordinator.graph().edge_count(),
            lambda: self.config.lambda,
            steps: coordinator.step_number(),
            finished: coordinator.is_finished(),
            visited_count: coordinator.visited_count(),
            robot_count: coordinator.robots().len(),
            active_robots: coordinator.active_robot_count(),
            blocked_moves: coordinator.blocked_moves(),
            reshuffles: coordinator.graph_history().len(),
            robots,
        }
    }
}
