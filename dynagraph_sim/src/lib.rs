//! Dynagraph simulation harness
//!
//! Builds a graph and a coordinator from one [`SimConfig`], drives the run
//! to completion under a step budget and reports the outcome.
//!
//! # Determinism
//!
//! All randomness is derived from a single 64-bit seed. Graph generation
//! and robot movement draw from separate streams, so changing the strategy
//! never changes the generated graph.
//!
//! # Usage
//!
//! ```ignore
//! use dynagraph_sim::{SimConfig, SimWorld};
//!
//! let config = SimConfig {
//!     seed: 42,
//!     node_count: 20,
//!     ..Default::default()
//! };
//!
//! let mut world = SimWorld::new(config)?;
//! let finished = world.run();
//! println!("{}", world.summary(false).to_json()?);
//! ```

mod config;
mod context;
mod error;
mod runner;
mod summary;
mod world;
pub mod scenarios;

pub use config::SimConfig;
pub use context::SimContext;
pub use error::SimError;
pub use runner::{ScenarioResult, ScenarioRunner};
pub use summary::{RobotSummary, RunSummary};
pub use world::SimWorld;
