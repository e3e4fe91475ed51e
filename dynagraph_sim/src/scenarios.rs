//! Preset scenarios for regression runs.

use dynagraph_core::{GraphKind, Lambda, StrategyKind};

use crate::config::SimConfig;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Single random walker on a path with mild edge failures
    PathExploration,

    /// Random-walk dispersion around a ring
    CycleDispersion,

    /// Several random walkers on a dense, very flaky complete graph
    CompleteExploration,

    /// Global-communication tree exploration on a random recursive tree
    TreeGlobal,

    /// Global-communication tree exploration on a binary tree, no failures
    BinaryTreeGlobal,

    /// Lazy spanning-structure exploration on a connected random graph
    RandomGraphGlobal,

    /// Random walkers on a path where most edges are down at any time
    FlakyPath,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::PathExploration,
            ScenarioId::CycleDispersion,
            ScenarioId::CompleteExploration,
            ScenarioId::TreeGlobal,
            ScenarioId::BinaryTreeGlobal,
            ScenarioId::RandomGraphGlobal,
            ScenarioId::FlakyPath,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::PathExploration => "path_exploration",
            ScenarioId::CycleDispersion => "cycle_dispersion",
            ScenarioId::CompleteExploration => "complete_exploration",
            ScenarioId::TreeGlobal => "tree_global",
            ScenarioId::BinaryTreeGlobal => "binary_tree_global",
            ScenarioId::RandomGraphGlobal => "random_graph_global",
            ScenarioId::FlakyPath => "flaky_path",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::PathExploration => "1 walker, 10-node path, lambda=1, 80% survival",
            ScenarioId::CycleDispersion => "11 dispersing walkers on a 12-node cycle",
            ScenarioId::CompleteExploration => "3 walkers, K12, lambda=2, 50% survival",
            ScenarioId::TreeGlobal => "30-node random tree, 2 robots per step, lambda=3, 70% survival",
            ScenarioId::BinaryTreeGlobal => "31-node binary tree, 4 robots per step, no reshuffling",
            ScenarioId::RandomGraphGlobal => "G(25, 0.2) connected, 2 robots per step, lambda=4",
            ScenarioId::FlakyPath => "2 walkers, 8-node path, reshuffled every step, 30% survival",
        }
    }

    /// Builds the run configuration for this scenario.
    pub fn config(&self, seed: u64) -> SimConfig {
        let base = SimConfig {
            seed,
            ..Default::default()
        };
        let steps = |period| Lambda::steps(period).unwrap_or_default();

        match self {
            ScenarioId::PathExploration => SimConfig {
                graph_kind: GraphKind::Path,
                node_count: 10,
                strategy: StrategyKind::RandomWalkExploration,
                robot_count: 1,
                lambda: steps(1),
                edge_survival_probability: 0.8,
                ..base
            },
            ScenarioId::CycleDispersion => SimConfig {
                graph_kind: GraphKind::Cycle,
                node_count: 12,
                strategy: StrategyKind::RandomWalkDispersion,
                robot_count: 11,
                lambda: steps(1),
                edge_survival_probability: 0.8,
                ..base
            },
            ScenarioId::CompleteExploration => SimConfig {
                graph_kind: GraphKind::Complete,
                node_count: 12,
                strategy: StrategyKind::RandomWalkExploration,
                robot_count: 3,
                lambda: steps(2),
                edge_survival_probability: 0.5,
                ..base
            },
            ScenarioId::TreeGlobal => SimConfig {
                graph_kind: GraphKind::ArbitraryTree,
                node_count: 30,
                strategy: StrategyKind::TreeGlobal,
                robot_count: 2,
                lambda: steps(3),
                edge_survival_probability: 0.7,
                ..base
            },
            ScenarioId::BinaryTreeGlobal => SimConfig {
                graph_kind: GraphKind::BinaryTree,
                node_count: 31,
                strategy: StrategyKind::TreeGlobal,
                robot_count: 4,
                lambda: Lambda::Infinite,
                ..base
            },
            ScenarioId::RandomGraphGlobal => SimConfig {
                graph_kind: GraphKind::ErdosRenyi,
                node_count: 25,
                edge_probability: 0.2,
                require_connected: true,
                strategy: StrategyKind::ArbitraryGlobal,
                robot_count: 2,
                lambda: steps(4),
                edge_survival_probability: 0.8,
                ..base
            },
            ScenarioId::FlakyPath => SimConfig {
                graph_kind: GraphKind::Path,
                node_count: 8,
                strategy: StrategyKind::RandomWalkExploration,
                robot_count: 2,
                lambda: steps(1),
                edge_survival_probability: 0.3,
                ..base
            },
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioId::all()
            .into_iter()
            .find(|scenario| scenario.name() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown scenario: {}", s))
    }
}
