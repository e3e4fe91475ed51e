//! Error types for graph generation and coordinator configuration.

use thiserror::Error;

use crate::graph::NodeId;

/// Invalid configuration, raised at the point of assignment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability parameter fell outside `[0, 1]` (or was NaN)
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability {
        /// Which parameter was rejected
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Generation needs at least one attempt
    #[error("max generation attempts must be at least 1, got {0}")]
    InvalidMaxAttempts(u32),

    /// Starting node does not exist in the graph
    #[error("starting node {node} is outside [0, {node_count})")]
    StartingNodeOutOfRange {
        /// Requested starting node
        node: NodeId,
        /// Number of nodes in the graph
        node_count: usize,
    },

    /// Lambda was neither a positive integer nor infinity
    #[error("lambda must be a positive integer or infinity, got {0:?}")]
    InvalidLambda(String),

    /// Graph-kind selector not recognized
    #[error("Unknown graph kind: {0}")]
    UnknownGraphKind(String),

    /// Strategy selector not recognized
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

impl ConfigError {
    /// Creates a probability error.
    pub fn probability(name: &'static str, value: f64) -> Self {
        Self::InvalidProbability { name, value }
    }
}

/// Errors that can occur while generating a graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// Connectivity was required but never achieved within the attempt budget
    #[error("graph still disconnected after {attempts} attempts")]
    NotConnected {
        /// Attempts spent
        attempts: u32,
    },

    /// Generator parameters were invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Rejects probabilities outside `[0, 1]`, NaN included.
pub fn validate_probability(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::probability(name, value))
    }
}
