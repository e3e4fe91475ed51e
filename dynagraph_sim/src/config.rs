//! Run configuration with validation at the point of assignment.

use dynagraph_core::error::validate_probability;
use dynagraph_core::{
    ConfigError, CoordinatorConfig, GeneratorConfig, GraphKind, Lambda, NodeId, StrategyKind,
};
use serde::{Deserialize, Serialize};

/// Configuration for a simulation run.
///
/// Fields can be set directly, in which case [`SimConfig::validate`] catches
/// mistakes when the world is built. The `set_*` methods validate on
/// assignment instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Graph family
    pub graph_kind: GraphKind,

    /// Number of nodes
    pub node_count: usize,

    /// One-way edges
    pub directed: bool,

    /// Allow self-loops (complete and Erdős–Rényi graphs)
    pub self_loops: bool,

    /// Pair inclusion probability for Erdős–Rényi graphs
    pub edge_probability: f64,

    /// Redraw Erdős–Rényi graphs until connected
    pub require_connected: bool,

    /// Attempt budget for `require_connected`
    pub max_generation_attempts: u32,

    /// Movement strategy
    pub strategy: StrategyKind,

    /// Robots per batch
    pub robot_count: usize,

    /// Start node for random-walk robots
    pub starting_node: NodeId,

    /// Steps between reshuffles
    pub lambda: Lambda,

    /// Probability an edge survives a reshuffle
    pub edge_survival_probability: f64,

    /// Steps between robot injections for global strategies (0 = never)
    pub injection_interval: u64,

    /// Step budget for a bounded run
    pub max_steps: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            graph_kind: GraphKind::Path,
            node_count: 10,
            directed: false,
            self_loops: false,
            edge_probability: 0.3,
            require_connected: true,
            max_generation_attempts: 100,
            strategy: StrategyKind::RandomWalkExploration,
            robot_count: 1,
            starting_node: 0,
            lambda: Lambda::default(),
            edge_survival_probability: 0.8,
            injection_interval: 1,
            max_steps: 10_000,
        }
    }
}

impl SimConfig {
    /// Sets the graph family from its selector name.
    pub fn set_graph_kind(&mut self, name: &str) -> Result<(), ConfigError> {
        self.graph_kind = name.parse()?;
        Ok(())
    }

    /// Sets the strategy from its selector name.
    pub fn set_strategy(&mut self, name: &str) -> Result<(), ConfigError> {
        self.strategy = name.parse()?;
        Ok(())
    }

    /// Sets the Erdős–Rényi pair probability.
    pub fn set_edge_probability(&mut self, probability: f64) -> Result<(), ConfigError> {
        self.edge_probability = validate_probability("edge probability", probability)?;
        Ok(())
    }

    /// Sets the generation attempt budget.
    pub fn set_max_generation_attempts(&mut self, attempts: u32) -> Result<(), ConfigError> {
        if attempts < 1 {
            return Err(ConfigError::InvalidMaxAttempts(attempts));
        }
        self.max_generation_attempts = attempts;
        Ok(())
    }

    /// Sets the starting node, which must exist for the current node count.
    pub fn set_starting_node(&mut self, node: NodeId) -> Result<(), ConfigError> {
        check_starting_node(node, self.node_count)?;
        self.starting_node = node;
        Ok(())
    }

    /// Sets lambda from text: a positive integer or `inf`.
    pub fn set_lambda(&mut self, lambda: &str) -> Result<(), ConfigError> {
        self.lambda = lambda.parse()?;
        Ok(())
    }

    /// Sets the edge survival probability.
    pub fn set_edge_survival_probability(&mut self, probability: f64) -> Result<(), ConfigError> {
        self.edge_survival_probability =
            validate_probability("edge survival probability", probability)?;
        Ok(())
    }

    /// Checks every field, including cross-field rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_probability("edge probability", self.edge_probability)?;
        validate_probability("edge survival probability", self.edge_survival_probability)?;
        if self.max_generation_attempts < 1 {
            return Err(ConfigError::InvalidMaxAttempts(self.max_generation_attempts));
        }
        check_starting_node(self.starting_node, self.node_count)
    }

    /// Returns true if the tree strategy is paired with a graph family that
    /// is not always a tree.
    pub fn tree_strategy_on_non_tree(&self) -> bool {
        self.strategy == StrategyKind::TreeGlobal && !self.graph_kind.is_tree()
    }

    /// Generator parameters for this run.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            kind: self.graph_kind,
            node_count: self.node_count,
            directed: self.directed,
            self_loops: self.self_loops,
            edge_probability: self.edge_probability,
            require_connected: self.require_connected,
            max_attempts: self.max_generation_attempts,
        }
    }

    /// Coordinator parameters for this run.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            lambda: self.lambda,
            edge_survival_probability: self.edge_survival_probability,
            robot_count: self.robot_count,
            starting_node: self.starting_node,
            injection_interval: self.injection_interval,
        }
    }
}

fn check_starting_node(node: NodeId, node_count: usize) -> Result<(), ConfigError> {
    if node >= node_count {
        return Err(ConfigError::StartingNodeOutOfRange { node, node_count });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_setters_reject_invalid_values() {
        let mut config = SimConfig::default();

        assert!(config.set_edge_probability(1.2).is_err());
        assert!(config.set_edge_survival_probability(-0.1).is_err());
        assert_eq!(
            config.set_max_generation_attempts(0),
            Err(ConfigError::InvalidMaxAttempts(0))
        );
        assert!(config.set_starting_node(10).is_err());
        assert!(config.set_lambda("0").is_err());
        assert!(config.set_graph_kind("hypercube").is_err());
        assert!(config.set_strategy("teleport").is_err());

        // Rejected assignments leave the config untouched
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_setters_accept_valid_values() {
        let mut config = SimConfig::default();

        config.set_edge_probability(0.5).unwrap();
        config.set_edge_survival_probability(1.0).unwrap();
        config.set_max_generation_attempts(3).unwrap();
        config.set_starting_node(9).unwrap();
        config.set_lambda("inf").unwrap();
        config.set_graph_kind("binary_tree").unwrap();
        config.set_strategy("tree").unwrap();

        assert_eq!(config.lambda, Lambda::Infinite);
        assert_eq!(config.graph_kind, GraphKind::BinaryTree);
        assert_eq!(config.strategy, StrategyKind::TreeGlobal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tree_strategy_on_non_tree() {
        let mut config = SimConfig {
            strategy: StrategyKind::TreeGlobal,
            graph_kind: GraphKind::BinaryTree,
            ..Default::default()
        };
        assert!(!config.tree_strategy_on_non_tree());

        config.graph_kind = GraphKind::Cycle;
        assert!(config.tree_strategy_on_non_tree());

        config.strategy = StrategyKind::ArbitraryGlobal;
        assert!(!config.tree_strategy_on_non_tree());
    }

    #[test]
    fn test_validate_catches_direct_assignment() {
        let config = SimConfig {
            node_count: 3,
            starting_node: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StartingNodeOutOfRange { node: 3, node_count: 3 })
        ));
    }
}
