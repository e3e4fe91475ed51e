//! JSON run summaries for CI parsing and external viewers.
//!
//! Summaries are printed, never written to disk.

use dynagraph_core::{GraphKind, Lambda, NodeId, RobotId, StrategyKind};
use serde::{Deserialize, Serialize};

/// Final position and trace of one robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotSummary {
    pub id: RobotId,
    pub start_node: NodeId,
    pub current_node: NodeId,
    pub active: bool,

    /// Integer-encoded trace (`-port - 100` marks a blocked attempt)
    pub ports_traversed: Vec<i64>,
}

/// Outcome of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Seed used
    pub seed: u64,

    /// Graph family
    pub graph_kind: GraphKind,

    /// Strategy
    pub strategy: StrategyKind,

    /// Nodes in the graph
    pub node_count: usize,

    /// Stored edge entries
    pub edge_count: usize,

    /// Reshuffle period
    pub lambda: Lambda,

    /// Steps executed
    pub steps: u64,

    /// Whether the termination condition was met
    pub finished: bool,

    /// Nodes visited at the end
    pub visited_count: usize,

    /// Robots created over the run
    pub robot_count: usize,

    /// Robots still active
    pub active_robots: usize,

    /// Moves attempted through blocked edges
    pub blocked_moves: u64,

    /// Snapshots in the graph history
    pub reshuffles: usize,

    /// Per-robot details (omitted unless requested)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub robots: Vec<RobotSummary>,
}

impl RunSummary {
    /// Fraction of nodes visited.
    pub fn coverage(&self) -> f64 {
        if self.node_count == 0 {
            return 1.0;
        }
        self.visited_count as f64 / self.node_count as f64
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
