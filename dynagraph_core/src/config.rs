//! Coordinator configuration: reshuffle period, survival probability and
//! robot population, plus the strategy selector.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

use crate::error::{validate_probability, ConfigError};
use crate::graph::NodeId;

/// Number of steps between edge reshuffles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lambda {
    /// Reshuffle on every step whose number is a multiple of this period
    Steps(NonZeroU64),

    /// Never reshuffle
    Infinite,
}

impl Lambda {
    /// Creates a finite lambda, rejecting zero.
    pub fn steps(period: u64) -> Result<Self, ConfigError> {
        NonZeroU64::new(period)
            .map(Lambda::Steps)
            .ok_or_else(|| ConfigError::InvalidLambda(period.to_string()))
    }

    /// Returns true if the edges get reshuffled at the start of `step`.
    pub fn is_reshuffle_step(&self, step: u64) -> bool {
        match self {
            Lambda::Steps(period) => step % period.get() == 0,
            Lambda::Infinite => false,
        }
    }
}

impl Default for Lambda {
    fn default() -> Self {
        Lambda::Steps(NonZeroU64::MIN)
    }
}

impl std::fmt::Display for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lambda::Steps(period) => write!(f, "{}", period),
            Lambda::Infinite => write!(f, "inf"),
        }
    }
}

impl std::str::FromStr for Lambda {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "inf" | "infinity" | "infinite" | "∞" => Ok(Lambda::Infinite),
            other => other
                .parse::<u64>()
                .ok()
                .and_then(NonZeroU64::new)
                .map(Lambda::Steps)
                .ok_or_else(|| ConfigError::InvalidLambda(trimmed.to_string())),
        }
    }
}

/// The fixed set of movement strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Random walk; each robot retires after claiming one new node
    RandomWalkDispersion,

    /// Random walk; robots keep moving until stuck
    RandomWalkExploration,

    /// Boundary-proportional routing over a precomputed tree
    TreeGlobal,

    /// Boundary-proportional routing over a lazily built spanning structure
    ArbitraryGlobal,
}

impl StrategyKind {
    /// Returns every strategy.
    pub fn all() -> Vec<StrategyKind> {
        vec![
            StrategyKind::RandomWalkDispersion,
            StrategyKind::RandomWalkExploration,
            StrategyKind::TreeGlobal,
            StrategyKind::ArbitraryGlobal,
        ]
    }

    /// Returns the strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::RandomWalkDispersion => "random_walk_dispersion",
            StrategyKind::RandomWalkExploration => "random_walk_exploration",
            StrategyKind::TreeGlobal => "tree_global",
            StrategyKind::ArbitraryGlobal => "arbitrary_global",
        }
    }

    /// Returns a description of the strategy.
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::RandomWalkDispersion => {
                "Random walk, every robot stops on the first unvisited node it reaches"
            }
            StrategyKind::RandomWalkExploration => {
                "Random walk, robots keep moving until every node is visited"
            }
            StrategyKind::TreeGlobal => {
                "Tree exploration with global communication, robots injected at the root"
            }
            StrategyKind::ArbitraryGlobal => {
                "Arbitrary-graph exploration with global communication and lazy spanning ports"
            }
        }
    }

    /// Returns true for the two boundary-routing strategies.
    pub fn uses_global_communication(&self) -> bool {
        matches!(self, StrategyKind::TreeGlobal | StrategyKind::ArbitraryGlobal)
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random_walk_dispersion" | "dispersion" | "rwd" => Ok(StrategyKind::RandomWalkDispersion),
            "random_walk_exploration" | "exploration" | "rwe" => {
                Ok(StrategyKind::RandomWalkExploration)
            }
            "tree_global" | "tree" => Ok(StrategyKind::TreeGlobal),
            "arbitrary_global" | "arbitrary" | "global" => Ok(StrategyKind::ArbitraryGlobal),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Configuration fixed at coordinator construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Steps between reshuffles
    pub lambda: Lambda,

    /// Probability that an edge is traversable after a reshuffle
    pub edge_survival_probability: f64,

    /// Robots created at construction (and per injection for global strategies)
    pub robot_count: usize,

    /// Start node for random-walk robots
    pub starting_node: NodeId,

    /// Global strategies inject a batch of robots at the root every this
    /// many steps (0 = never)
    pub injection_interval: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            lambda: Lambda::default(),
            edge_survival_probability: 0.8,
            robot_count: 1,
            starting_node: 0,
            injection_interval: 1,
        }
    }
}

impl CoordinatorConfig {
    /// Checks every field against a graph with `node_count` nodes.
    pub fn validate(&self, node_count: usize) -> Result<(), ConfigError> {
        validate_probability("edge survival probability", self.edge_survival_probability)?;
        if self.starting_node >= node_count {
            return Err(ConfigError::StartingNodeOutOfRange {
                node: self.starting_node,
                node_count,
            });
        }
        Ok(())
    }

    /// Returns true if a global strategy injects robots after `step`.
    pub fn injects_at(&self, step: u64) -> bool {
        self.injection_interval != 0 && step % self.injection_interval == 0
    }
}
