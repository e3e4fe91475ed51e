//! Factories for well-known graph families.
//!
//! Every generated edge starts with weight 1 (traversable). Functions that
//! need randomness take the caller's RNG so generation is reproducible.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{validate_probability, ConfigError, GenerationError};
use crate::graph::Graph;

/// Builds a path `0 - 1 - ... - (n-1)`.
pub fn path(node_count: usize, directed: bool) -> Graph {
    let mut graph = Graph::with_nodes(node_count, directed);
    for node in 1..node_count {
        graph.add_edge(node - 1, node, 1.0);
    }
    graph
}

/// Builds a path plus the wrap-around edge `(n-1) -> 0`.
///
/// With fewer than three nodes the wrap-around edge would duplicate an
/// existing edge or form a self-loop, so those sizes yield a plain path.
pub fn cycle(node_count: usize, directed: bool) -> Graph {
    let mut graph = path(node_count, directed);
    if node_count >= 3 {
        graph.add_edge(node_count - 1, 0, 1.0);
    }
    graph
}

/// Connects every pair of nodes, optionally adding self-loops.
///
/// A directed complete graph holds both `i -> j` and `j -> i`.
pub fn complete_graph(node_count: usize, directed: bool, self_loops: bool) -> Graph {
    let mut graph = Graph::with_nodes(node_count, directed);
    for source in 0..node_count {
        let first_target = if directed { 0 } else { source };
        for target in first_target..node_count {
            if source == target && !self_loops {
                continue;
            }
            graph.add_edge(source, target, 1.0);
        }
    }
    graph
}

/// Random recursive tree: node `i` attaches to a uniform parent in `[0, i)`.
pub fn arbitrary_tree<R: Rng + ?Sized>(node_count: usize, directed: bool, rng: &mut R) -> Graph {
    let mut graph = Graph::with_nodes(node_count, directed);
    for node in 1..node_count {
        let parent = rng.gen_range(0..node);
        graph.add_edge(parent, node, 1.0);
    }
    graph
}

/// Heap-ordered binary tree: node `i` attaches to `(i - 1) / 2`.
pub fn binary_tree(node_count: usize, directed: bool) -> Graph {
    let mut graph = Graph::with_nodes(node_count, directed);
    for node in 1..node_count {
        graph.add_edge((node - 1) / 2, node, 1.0);
    }
    graph
}

/// Erdős–Rényi `G(n, p)` graph.
///
/// Directed graphs draw every ordered pair `(i, j)`, undirected graphs every
/// unordered pair once. With `require_connected` the whole graph is redrawn
/// until it is connected, failing after `max_attempts` tries.
pub fn erdos_renyi_random_graph<R: Rng + ?Sized>(
    node_count: usize,
    edge_probability: f64,
    directed: bool,
    self_loops: bool,
    require_connected: bool,
    max_attempts: u32,
    rng: &mut R,
) -> Result<Graph, GenerationError> {
    validate_probability("edge probability", edge_probability)?;
    if max_attempts < 1 {
        return Err(ConfigError::InvalidMaxAttempts(max_attempts).into());
    }

    for attempt in 1..=max_attempts {
        let graph = draw_erdos_renyi(node_count, edge_probability, directed, self_loops, rng);
        if !require_connected || graph.is_connected() {
            debug!(
                "Generated G({}, {}) with {} edge entries on attempt {}",
                node_count,
                edge_probability,
                graph.edge_count(),
                attempt
            );
            return Ok(graph);
        }
        debug!("Attempt {}/{}: graph disconnected, redrawing", attempt, max_attempts);
    }

    warn!(
        "Failed to draw a connected G({}, {}) in {} attempts",
        node_count, edge_probability, max_attempts
    );
    Err(GenerationError::NotConnected {
        attempts: max_attempts,
    })
}

fn draw_erdos_renyi<R: Rng + ?Sized>(
    node_count: usize,
    edge_probability: f64,
    directed: bool,
    self_loops: bool,
    rng: &mut R,
) -> Graph {
    let mut graph = Graph::with_nodes(node_count, directed);
    for source in 0..node_count {
        let first_target = if directed { 0 } else { source };
        for target in first_target..node_count {
            if source == target && !self_loops {
                continue;
            }
            if rng.gen::<f64>() < edge_probability {
                graph.add_edge(source, target, 1.0);
            }
        }
    }
    graph
}

/// Graph family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphKind {
    /// Simple path
    Path,

    /// Path with a wrap-around edge
    Cycle,

    /// All pairs connected
    Complete,

    /// Random recursive tree
    ArbitraryTree,

    /// Heap-ordered binary tree
    BinaryTree,

    /// Erdős–Rényi random graph
    ErdosRenyi,
}

impl GraphKind {
    /// Returns every graph kind.
    pub fn all() -> Vec<GraphKind> {
        vec![
            GraphKind::Path,
            GraphKind::Cycle,
            GraphKind::Complete,
            GraphKind::ArbitraryTree,
            GraphKind::BinaryTree,
            GraphKind::ErdosRenyi,
        ]
    }

    /// Returns the graph kind name.
    pub fn name(&self) -> &'static str {
        match self {
            GraphKind::Path => "path",
            GraphKind::Cycle => "cycle",
            GraphKind::Complete => "complete",
            GraphKind::ArbitraryTree => "arbitrary_tree",
            GraphKind::BinaryTree => "binary_tree",
            GraphKind::ErdosRenyi => "erdos_renyi",
        }
    }

    /// Returns true if every generated instance is a tree.
    pub fn is_tree(&self) -> bool {
        matches!(self, GraphKind::Path | GraphKind::ArbitraryTree | GraphKind::BinaryTree)
    }
}

impl std::fmt::Display for GraphKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for GraphKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "path" => Ok(GraphKind::Path),
            "cycle" | "ring" => Ok(GraphKind::Cycle),
            "complete" | "complete_graph" => Ok(GraphKind::Complete),
            "arbitrary_tree" | "tree" | "random_tree" => Ok(GraphKind::ArbitraryTree),
            "binary_tree" | "binary" => Ok(GraphKind::BinaryTree),
            "erdos_renyi" | "erdos-renyi" | "random" | "gnp" => Ok(GraphKind::ErdosRenyi),
            _ => Err(ConfigError::UnknownGraphKind(s.to_string())),
        }
    }
}

/// Parameters for generating a graph of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Which family to generate
    pub kind: GraphKind,

    /// Number of nodes
    pub node_count: usize,

    /// One-way edges
    pub directed: bool,

    /// Allow self-loops (complete and Erdős–Rényi only)
    pub self_loops: bool,

    /// Pair inclusion probability (Erdős–Rényi only)
    pub edge_probability: f64,

    /// Redraw until connected (Erdős–Rényi only)
    pub require_connected: bool,

    /// Attempt budget for `require_connected`
    pub max_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kind: GraphKind::Path,
            node_count: 10,
            directed: false,
            self_loops: false,
            edge_probability: 0.3,
            require_connected: true,
            max_attempts: 100,
        }
    }
}

impl GeneratorConfig {
    /// Generates a graph of the configured kind.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Graph, GenerationError> {
        let graph = match self.kind {
            GraphKind::Path => path(self.node_count, self.directed),
            GraphKind::Cycle => cycle(self.node_count, self.directed),
            GraphKind::Complete => complete_graph(self.node_count, self.directed, self.self_loops),
            GraphKind::ArbitraryTree => arbitrary_tree(self.node_count, self.directed, rng),
            GraphKind::BinaryTree => binary_tree(self.node_count, self.directed),
            GraphKind::ErdosRenyi => erdos_renyi_random_graph(
                self.node_count,
                self.edge_probability,
                self.directed,
                self.self_loops,
                self.require_connected,
                self.max_attempts,
                rng,
            )?,
        };
        Ok(graph)
    }
}
