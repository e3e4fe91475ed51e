//! Port-addressed graph with dynamic edge availability.
//!
//! Nodes are identified by their position in the node list and every incident
//! edge is addressed by its *port*: the index of the edge inside its source
//! node's edge list. The sign of an edge weight encodes availability:
//!
//! - non-negative weight: the edge can be traversed
//! - negative weight: the edge is currently blocked
//!
//! Reshuffling only flips signs, so the topology (and every `|weight|`) is
//! stable for the lifetime of a run.
//!
//! # Preconditions
//!
//! Node ids and ports are validated by the caller. Passing an id or port that
//! is out of range panics through slice indexing.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Positional node identifier. Ids compact when a node is removed.
pub type NodeId = usize;

/// Index of an edge within its source node's edge list.
pub type Port = usize;

/// A directed edge entry stored at its source node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Signed weight: the sign is availability, the magnitude is the weight
    pub weight: f64,

    /// Node this edge leads to
    pub target: NodeId,
}

impl Edge {
    /// Creates a new edge toward `target`.
    pub fn new(target: NodeId, weight: f64) -> Self {
        Self { weight, target }
    }

    /// Returns true if the edge can currently be traversed.
    ///
    /// This is a sign-bit test, not `weight >= 0.0`: a weight of `-0.0` counts
    /// as blocked even though it compares equal to zero, so zero-weight edges
    /// can still be reshuffled out.
    pub fn is_traversable(&self) -> bool {
        !self.weight.is_sign_negative()
    }
}

/// A node together with its outgoing edges (ordered by port).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Node weight
    pub weight: f64,

    /// Incident edges; the index is the port number
    pub edges: Vec<Edge>,
}

impl Vertex {
    /// Creates an isolated vertex.
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            edges: Vec::new(),
        }
    }
}

/// Graph whose edges intermittently fail and recover.
///
/// In an undirected graph every edge `u -> v` has a mirror `v -> u`. Mirrors
/// are found by matching the target node, never through a stored back
/// pointer, and always share the same magnitude and sign. A self-loop in an
/// undirected graph is stored once and is its own mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Vertex>,
    directed: bool,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new(directed: bool) -> Self {
        Self {
            nodes: Vec::new(),
            directed,
        }
    }

    /// Creates a graph with `node_count` isolated nodes of weight 1.
    pub fn with_nodes(node_count: usize, directed: bool) -> Self {
        Self {
            nodes: vec![Vertex::new(1.0); node_count],
            directed,
        }
    }

    /// Returns true if edges are one-way.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Read access to the node list.
    pub fn nodes(&self) -> &[Vertex] {
        &self.nodes
    }

    /// Returns a node by id.
    pub fn node(&self, node: NodeId) -> &Vertex {
        &self.nodes[node]
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored edge entries (an undirected edge counts twice,
    /// an undirected self-loop once).
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|v| v.edges.len()).sum()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Appends a node and returns its id.
    pub fn add_node(&mut self, weight: f64) -> NodeId {
        self.nodes.push(Vertex::new(weight));
        self.nodes.len() - 1
    }

    /// Adds an edge, plus its mirror when the graph is undirected.
    ///
    /// Returns the port of the new edge at `source`.
    ///
    /// # Panics
    /// Panics if either node id is out of range.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, weight: f64) -> Port {
        assert!(target < self.nodes.len(), "target node {target} out of range");
        let edges = &mut self.nodes[source].edges;
        edges.push(Edge::new(target, weight));
        let port = edges.len() - 1;

        if !self.directed && source != target {
            self.nodes[target].edges.push(Edge::new(source, weight));
        }
        port
    }

    /// Removes a node and every edge that referenced it.
    ///
    /// Node ids above `node` shift down by one, and every edge target is
    /// renumbered to match.
    ///
    /// # Panics
    /// Panics if `node` is out of range.
    pub fn remove_node(&mut self, node: NodeId) -> Vertex {
        let removed = self.nodes.remove(node);
        for vertex in &mut self.nodes {
            vertex.edges.retain(|edge| edge.target != node);
            for edge in &mut vertex.edges {
                if edge.target > node {
                    edge.target -= 1;
                }
            }
        }
        removed
    }

    /// Removes the first edge `source -> target` (and its mirror).
    ///
    /// Returns `None` if no such edge exists.
    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> Option<Edge> {
        let port = self.port_from_adjacent_node(source, target)?;
        let removed = self.nodes[source].edges.remove(port);

        if !self.directed && source != target {
            if let Some(mirror) = self.port_from_adjacent_node(target, source) {
                self.nodes[target].edges.remove(mirror);
            }
        }
        Some(removed)
    }

    /// Sets a node's weight.
    pub fn set_node_weight(&mut self, node: NodeId, weight: f64) {
        self.nodes[node].weight = weight;
    }

    /// Sets the weight of the edge at `port`, mirrored when undirected.
    ///
    /// # Panics
    /// Panics if `node` or `port` is out of range.
    pub fn set_edge_weight(&mut self, node: NodeId, port: Port, weight: f64) {
        let mirror = self.mirror_of(node, port);
        self.nodes[node].edges[port].weight = weight;
        if let Some((target, mirror_port)) = mirror {
            self.nodes[target].edges[mirror_port].weight = weight;
        }
    }

    /// Makes the edge at `port` traversable (`positive`) or blocked,
    /// preserving its magnitude.
    pub fn set_edge_weight_sign(&mut self, node: NodeId, port: Port, positive: bool) {
        let magnitude = self.nodes[node].edges[port].weight.abs();
        let weight = if positive { magnitude } else { -magnitude };
        self.set_edge_weight(node, port, weight);
    }

    /// Re-draws the availability of every edge.
    ///
    /// Each stored edge entry gets its own uniform draw and survives with
    /// probability `survival_probability`. An undirected pair is therefore
    /// visited twice: the second draw decides the final sign of both mirrors.
    pub fn set_random_edge_weight_signs<R: Rng + ?Sized>(
        &mut self,
        survival_probability: f64,
        rng: &mut R,
    ) {
        let mut surviving = 0usize;
        for node in 0..self.nodes.len() {
            for port in 0..self.nodes[node].edges.len() {
                let draw: f64 = rng.gen();
                let positive = draw < survival_probability;
                if positive {
                    surviving += 1;
                }
                self.set_edge_weight_sign(node, port, positive);
            }
        }
        debug!(
            "Reshuffled {} edge entries ({} drawn traversable)",
            self.edge_count(),
            surviving
        );
    }

    /// Locates the mirror of the edge at `port`, if the graph keeps one.
    fn mirror_of(&self, node: NodeId, port: Port) -> Option<(NodeId, Port)> {
        let target = self.nodes[node].edges[port].target;
        if self.directed || target == node {
            return None;
        }
        self.port_from_adjacent_node(target, node)
            .map(|mirror| (target, mirror))
    }

    // ------------------------------------------------------------------
    // Port accessors
    // ------------------------------------------------------------------

    /// Number of ports (incident edges) at `node`.
    pub fn number_of_ports(&self, node: NodeId) -> usize {
        self.nodes[node].edges.len()
    }

    /// Node reached through `port` of `node`.
    pub fn adjacent_node_from_port(&self, node: NodeId, port: Port) -> NodeId {
        self.nodes[node].edges[port].target
    }

    /// Signed weight of the edge at `port` of `node`.
    pub fn edge_weight_from_port(&self, node: NodeId, port: Port) -> f64 {
        self.nodes[node].edges[port].weight
    }

    /// Returns true if the edge at `port` of `node` is currently traversable.
    pub fn is_traversable(&self, node: NodeId, port: Port) -> bool {
        self.nodes[node].edges[port].is_traversable()
    }

    /// First port of `node` leading to `adjacent`, O(degree).
    pub fn port_from_adjacent_node(&self, node: NodeId, adjacent: NodeId) -> Option<Port> {
        self.nodes[node]
            .edges
            .iter()
            .position(|edge| edge.target == adjacent)
    }

    /// Every port of `node` except `parent_port`.
    pub fn child_ports(&self, node: NodeId, parent_port: Option<Port>) -> Vec<Port> {
        (0..self.number_of_ports(node))
            .filter(|&port| Some(port) != parent_port)
            .collect()
    }

    /// Iterates over the nodes adjacent to `node`, in port order.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node].edges.iter().map(|edge| edge.target)
    }

    // ------------------------------------------------------------------
    // Queries (all edges count, whatever their current sign)
    // ------------------------------------------------------------------

    /// BFS hop distances from `root`; `None` marks unreachable nodes.
    fn bfs_distances(&self, root: NodeId) -> Vec<Option<usize>> {
        let mut distances = vec![None; self.nodes.len()];
        let mut queue = VecDeque::new();
        distances[root] = Some(0);
        queue.push_back(root);

        while let Some(node) = queue.pop_front() {
            let next = distances[node].map_or(0, |d| d + 1);
            for neighbor in self.neighbors(node) {
                if distances[neighbor].is_none() {
                    distances[neighbor] = Some(next);
                    queue.push_back(neighbor);
                }
            }
        }
        distances
    }

    /// Shortest path from `from` to `to` as a node sequence, both ends included.
    ///
    /// Blocked edges are still part of the topology and are used.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        let mut predecessor: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        seen[from] = true;
        queue.push_back(from);

        while let Some(node) = queue.pop_front() {
            if node == to {
                let mut path = vec![to];
                let mut current = to;
                while let Some(previous) = predecessor[current] {
                    path.push(previous);
                    current = previous;
                }
                path.reverse();
                return Some(path);
            }
            for neighbor in self.neighbors(node) {
                if !seen[neighbor] {
                    seen[neighbor] = true;
                    predecessor[neighbor] = Some(node);
                    queue.push_back(neighbor);
                }
            }
        }
        None
    }

    /// Hop count of the shortest path; `None` means infinitely far.
    pub fn distance_between_nodes(&self, from: NodeId, to: NodeId) -> Option<usize> {
        self.shortest_path(from, to).map(|path| path.len() - 1)
    }

    /// Eccentricity of `root` over the nodes it can reach.
    ///
    /// Equals the tree depth when the graph is a tree rooted at `root`.
    pub fn depth(&self, root: NodeId) -> usize {
        self.bfs_distances(root)
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(0)
    }

    /// Returns true if every node is reachable from node 0.
    ///
    /// For directed graphs this is reachability along edge direction.
    /// The empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        self.bfs_distances(0).iter().all(Option::is_some)
    }

    /// Independent copy of every vertex and edge, for history snapshots.
    pub fn deep_copy_nodes(&self) -> Vec<Vertex> {
        self.nodes
            .iter()
            .map(|vertex| Vertex {
                weight: vertex.weight,
                edges: vertex.edges.to_vec(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn triangle(directed: bool) -> Graph {
        let mut graph = Graph::with_nodes(3, directed);
        graph.add_edge(0, 1, 1.0);
        graph.add_edge(1, 2, 2.0);
        graph.add_edge(2, 0, 3.0);
        graph
    }

    fn assert_mirrors_consistent(graph: &Graph) {
        for (node, vertex) in graph.nodes().iter().enumerate() {
            for edge in &vertex.edges {
                let mirror = graph
                    .port_from_adjacent_node(edge.target, node)
                    .expect("undirected edge must have a mirror");
                let mirror_weight = graph.edge_weight_from_port(edge.target, mirror);
                assert_eq!(edge.weight.abs(), mirror_weight.abs());
                assert_eq!(edge.is_traversable(), mirror_weight.is_sign_positive());
            }
        }
    }

    #[test]
    fn test_zero_weight_edge_can_be_blocked() {
        assert!(Edge::new(1, 0.0).is_traversable());
        assert!(!Edge::new(1, -0.0).is_traversable());

        let mut graph = Graph::with_nodes(2, false);
        graph.add_edge(0, 1, 0.0);
        graph.set_edge_weight_sign(0, 0, false);
        assert!(!graph.is_traversable(0, 0));
        assert!(!graph.is_traversable(1, 0));
        graph.set_edge_weight_sign(1, 0, true);
        assert!(graph.is_traversable(0, 0));
    }

    #[test]
    fn test_add_edge_undirected_adds_mirror() {
        let graph = triangle(false);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.number_of_ports(0), 2);
        assert_eq!(graph.adjacent_node_from_port(0, 0), 1);
        assert_eq!(graph.adjacent_node_from_port(0, 1), 2);
        assert_eq!(graph.port_from_adjacent_node(1, 0), Some(0));
    }

    #[test]
    fn test_add_edge_directed_is_one_way() {
        let graph = triangle(true);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.port_from_adjacent_node(1, 0), None);
    }

    #[test]
    fn test_undirected_self_loop_stored_once() {
        let mut graph = Graph::with_nodes(1, false);
        graph.add_edge(0, 0, 1.0);
        assert_eq!(graph.number_of_ports(0), 1);

        graph.set_edge_weight_sign(0, 0, false);
        assert!(!graph.is_traversable(0, 0));
    }

    #[test]
    fn test_set_edge_weight_mirrors() {
        let mut graph = triangle(false);
        graph.set_edge_weight(0, 0, 5.0);
        assert_eq!(graph.edge_weight_from_port(1, 0), 5.0);

        graph.set_edge_weight_sign(1, 0, false);
        assert_eq!(graph.edge_weight_from_port(0, 0), -5.0);
        assert_eq!(graph.edge_weight_from_port(1, 0), -5.0);

        graph.set_edge_weight_sign(0, 0, true);
        assert_eq!(graph.edge_weight_from_port(1, 0), 5.0);
    }

    #[test]
    fn test_reshuffle_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut graph = triangle(false);

        graph.set_random_edge_weight_signs(0.0, &mut rng);
        assert!(graph.nodes().iter().flat_map(|v| &v.edges).all(|e| !e.is_traversable()));

        graph.set_random_edge_weight_signs(1.0, &mut rng);
        assert!(graph.nodes().iter().flat_map(|v| &v.edges).all(Edge::is_traversable));

        // Magnitudes survive both flips
        assert_eq!(graph.edge_weight_from_port(1, 1), 2.0);
        assert_eq!(graph.edge_weight_from_port(2, 1), 3.0);
    }

    #[test]
    fn test_reshuffle_survival_fraction() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut graph = Graph::with_nodes(40, true);
        for i in 0..40 {
            for j in 0..40 {
                if i != j {
                    graph.add_edge(i, j, 1.0);
                }
            }
        }

        graph.set_random_edge_weight_signs(0.7, &mut rng);
        let surviving = graph
            .nodes()
            .iter()
            .flat_map(|v| &v.edges)
            .filter(|e| e.is_traversable())
            .count();
        let fraction = surviving as f64 / graph.edge_count() as f64;
        approx::assert_abs_diff_eq!(fraction, 0.7, epsilon = 0.05);
    }

    #[test]
    fn test_remove_node_renumbers_targets() {
        let mut graph = Graph::with_nodes(4, false);
        graph.add_edge(0, 1, 1.0);
        graph.add_edge(1, 2, 1.0);
        graph.add_edge(2, 3, 1.0);
        graph.add_edge(3, 0, 1.0);

        graph.remove_node(1);

        assert_eq!(graph.node_count(), 3);
        // Old node 2 is now 1, old node 3 is now 2
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![2]);
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn test_remove_edge_removes_mirror() {
        let mut graph = triangle(false);
        let removed = graph.remove_edge(2, 1).unwrap();
        assert_eq!(removed.target, 1);
        assert_eq!(graph.port_from_adjacent_node(1, 2), None);
        assert_eq!(graph.edge_count(), 4);

        assert_eq!(graph.remove_edge(2, 1), None);
    }

    #[test]
    fn test_child_ports_skip_parent() {
        let graph = triangle(false);
        assert_eq!(graph.child_ports(0, Some(0)), vec![1]);
        assert_eq!(graph.child_ports(0, None), vec![0, 1]);
    }

    #[test]
    fn test_shortest_path_on_cycle() {
        let mut graph = Graph::with_nodes(5, false);
        for i in 0..4 {
            graph.add_edge(i, i + 1, 1.0);
        }
        graph.add_edge(4, 0, 1.0);

        let path = graph.shortest_path(0, 3).unwrap();
        assert_eq!(path, vec![0, 4, 3]);
        assert_eq!(graph.distance_between_nodes(0, 2), Some(2));
        assert_eq!(graph.distance_between_nodes(1, 1), Some(0));
    }

    #[test]
    fn test_shortest_path_ignores_sign() {
        let mut graph = Graph::with_nodes(2, false);
        graph.add_edge(0, 1, 1.0);
        graph.set_edge_weight_sign(0, 0, false);
        assert_eq!(graph.shortest_path(0, 1), Some(vec![0, 1]));
    }

    #[test]
    fn test_disconnected_graph() {
        let mut graph = Graph::with_nodes(3, false);
        graph.add_edge(0, 1, 1.0);
        assert!(!graph.is_connected());
        assert_eq!(graph.distance_between_nodes(0, 2), None);
        assert!(Graph::new(false).is_connected());
    }

    #[test]
    fn test_directed_connectivity_follows_direction() {
        let mut graph = Graph::with_nodes(2, true);
        graph.add_edge(1, 0, 1.0);
        assert!(!graph.is_connected());
        graph.add_edge(0, 1, 1.0);
        assert!(graph.is_connected());
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let mut graph = triangle(false);
        let snapshot = graph.deep_copy_nodes();

        graph.set_edge_weight_sign(0, 0, false);
        graph.set_node_weight(2, 9.0);
        graph.add_edge(0, 0, 1.0);

        assert_eq!(snapshot[0].edges[0].weight, 1.0);
        assert_eq!(snapshot[2].weight, 1.0);
        assert_eq!(snapshot[0].edges.len(), 2);
    }

    fn arbitrary_undirected() -> impl Strategy<Value = Graph> {
        (2usize..12)
            .prop_flat_map(|n| {
                (
                    Just(n),
                    prop::collection::vec((0..n, 0..n, 1.0f64..10.0), 0..30),
                )
            })
            .prop_map(|(n, edges)| {
                let mut graph = Graph::with_nodes(n, false);
                for (source, target, weight) in edges {
                    if source != target && graph.port_from_adjacent_node(source, target).is_none() {
                        graph.add_edge(source, target, weight);
                    }
                }
                graph
            })
    }

    proptest! {
        #[test]
        fn prop_reshuffle_keeps_mirrors_consistent(
            graph in arbitrary_undirected(),
            seed in any::<u64>(),
            survival in 0.0f64..=1.0,
        ) {
            let mut graph = graph;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            graph.set_random_edge_weight_signs(survival, &mut rng);
            assert_mirrors_consistent(&graph);
        }

        #[test]
        fn prop_remove_node_renumbers(graph in arbitrary_undirected(), pick in any::<prop::sample::Index>()) {
            let removed = pick.index(graph.node_count());
            let mut after = graph.clone();
            after.remove_node(removed);

            prop_assert_eq!(after.node_count(), graph.node_count() - 1);
            for (old_id, vertex) in graph.nodes().iter().enumerate() {
                if old_id == removed {
                    continue;
                }
                let new_id = if old_id > removed { old_id - 1 } else { old_id };
                let expected: Vec<NodeId> = vertex
                    .edges
                    .iter()
                    .filter(|e| e.target != removed)
                    .map(|e| if e.target > removed { e.target - 1 } else { e.target })
                    .collect();
                prop_assert_eq!(after.neighbors(new_id).collect::<Vec<_>>(), expected);
            }
        }
    }
}
