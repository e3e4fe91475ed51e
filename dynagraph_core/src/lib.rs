//! Dynagraph Core - Robot Exploration on Graphs with Failing Edges
//!
//! Mobile agents ("robots") explore or disperse across a graph whose edges
//! intermittently fail and recover. Two subsystems do the work:
//!
//! 1. **Graph**: a port-addressed adjacency structure whose edge weights carry
//!    availability in their sign, plus generators for common families.
//! 2. **Coordinator**: a synchronous, step-driven state machine that owns the
//!    robots and applies one of four movement strategies.
//!
//! All randomness is injected by the caller, so a seeded RNG makes every run
//! reproducible.
//!
//! # Usage
//!
//! ```ignore
//! use dynagraph_core::{generator, Coordinator, CoordinatorConfig, Lambda, StrategyKind};
//! use rand::SeedableRng;
//!
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
//! let graph = generator::binary_tree(15, false);
//! let config = CoordinatorConfig { lambda: Lambda::Infinite, ..Default::default() };
//!
//! let mut coordinator = Coordinator::new(graph, StrategyKind::TreeGlobal, config, rng)?;
//! coordinator.run_for(1_000);
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod generator;
pub mod global;
pub mod graph;
pub mod robot;
mod random_walk;

// Re-export key types for convenience
pub use config::{CoordinatorConfig, Lambda, StrategyKind};
pub use coordinator::{Coordinator, GraphSnapshot, ROOT};
pub use error::{ConfigError, GenerationError};
pub use generator::{GeneratorConfig, GraphKind};
pub use global::SpanningPorts;
pub use graph::{Edge, Graph, NodeId, Port, Vertex};
pub use robot::{Robot, RobotId, RobotState, Traversal};
