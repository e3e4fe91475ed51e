//! Error types for the simulation harness.

use dynagraph_core::{ConfigError, GenerationError};
use thiserror::Error;

/// Errors that can stop a simulation from being built.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Graph generation failed
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Summary could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
