//! Exploration with global communication.
//!
//! Robots at a visited node are split across its child ports in proportion
//! to how much unexplored frontier ("boundary") lies below each port. Two
//! flavours share the planning code and differ only in how the spanning
//! structure is obtained:
//!
//! - **Tree**: parent/child ports for the whole graph are computed up front
//!   by a BFS from the root.
//! - **Arbitrary graph**: a node's ports are computed the first time a robot
//!   reaches it. Its parent is the port leading back to where the robot came
//!   from, and child ports toward already-visited nodes are dropped so a node
//!   is not reached along several branches.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

use crate::coordinator::Plan;
use crate::graph::{Graph, NodeId, Port};
use crate::robot::Robot;

/// Per-node parent and child ports of a spanning structure.
///
/// `children[node]` is `None` until the node's ports have been computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanningPorts {
    parents: Vec<Option<Port>>,
    children: Vec<Option<Vec<Port>>>,
}

impl SpanningPorts {
    fn empty(node_count: usize) -> Self {
        Self {
            parents: vec![None; node_count],
            children: vec![None; node_count],
        }
    }

    /// Orients a tree away from `root` (BFS).
    ///
    /// A node's parent port is its port back to the node that discovered it
    /// (`None` at the root, or when a directed tree has no back edge). Child
    /// ports are the ports toward nodes it discovered. Nodes unreachable from
    /// `root` stay uncomputed.
    pub fn treeify(graph: &Graph, root: NodeId) -> Self {
        let mut ports = Self::empty(graph.node_count());
        let mut seen = vec![false; graph.node_count()];
        let mut queue = VecDeque::new();
        seen[root] = true;
        queue.push_back(root);

        while let Some(node) = queue.pop_front() {
            let mut children = Vec::new();
            for port in graph.child_ports(node, ports.parents[node]) {
                let child = graph.adjacent_node_from_port(node, port);
                if seen[child] {
                    continue;
                }
                seen[child] = true;
                ports.parents[child] = graph.port_from_adjacent_node(child, node);
                children.push(port);
                queue.push_back(child);
            }
            ports.children[node] = Some(children);
        }
        ports
    }

    /// Starts a lazily built structure with only `root` computed.
    pub fn rooted(graph: &Graph, root: NodeId, visited: &[bool]) -> Self {
        let mut ports = Self::empty(graph.node_count());
        ports.children[root] = Some(unvisited_ports(graph, root, None, visited));
        ports
    }

    /// Computes `node`'s ports on first arrival from `arrived_from`.
    ///
    /// Does nothing if the node was already computed.
    pub fn claim(&mut self, graph: &Graph, visited: &[bool], node: NodeId, arrived_from: NodeId) {
        if self.children[node].is_some() {
            return;
        }
        let parent = graph.port_from_adjacent_node(node, arrived_from);
        let children = unvisited_ports(graph, node, parent, visited);
        trace!(
            "Node {} claimed from {}: parent port {:?}, child ports {:?}",
            node,
            arrived_from,
            parent,
            children
        );
        self.parents[node] = parent;
        self.children[node] = Some(children);
    }

    /// Port leading toward the root, if known.
    pub fn parent_port(&self, node: NodeId) -> Option<Port> {
        self.parents[node]
    }

    /// Child ports, or `None` if the node has not been computed yet.
    pub fn child_ports(&self, node: NodeId) -> Option<&[Port]> {
        self.children[node].as_deref()
    }

    /// Returns true once the node's ports have been computed.
    pub fn is_computed(&self, node: NodeId) -> bool {
        self.children[node].is_some()
    }

    /// Boundary count of the branch rooted at `node`.
    ///
    /// An unvisited node is one frontier node. A visited node contributes the
    /// sum over its child ports, so a fully explored leaf contributes 0. In
    /// the arbitrary-graph variant a frontier node reachable along several
    /// child paths is counted once per path.
    pub fn boundary_count(&self, graph: &Graph, visited: &[bool], node: NodeId) -> u64 {
        let mut memo = vec![None; graph.node_count()];
        self.memoized_boundary(graph, visited, node, &mut memo)
    }

    /// Boundary count with per-node results cached in `memo`.
    ///
    /// Child ports only lead to nodes visited later than their parent, so the
    /// structure is acyclic and a post-order fills `memo` bottom-up.
    fn memoized_boundary(
        &self,
        graph: &Graph,
        visited: &[bool],
        node: NodeId,
        memo: &mut [Option<u64>],
    ) -> u64 {
        let mut stack = vec![(node, false)];
        while let Some((current, expanded)) = stack.pop() {
            let children = self.child_ports(current).unwrap_or_default();
            if expanded {
                let sum = children.iter().fold(0u64, |sum, &port| {
                    let child = graph.adjacent_node_from_port(current, port);
                    sum.saturating_add(memo[child].unwrap_or(0))
                });
                memo[current] = Some(sum);
                continue;
            }
            if memo[current].is_some() {
                continue;
            }
            if !visited[current] {
                memo[current] = Some(1);
                continue;
            }

            // Placeholder until the children are summed
            memo[current] = Some(0);
            stack.push((current, true));
            for &port in children {
                let child = graph.adjacent_node_from_port(current, port);
                if memo[child].is_none() {
                    stack.push((child, false));
                }
            }
        }
        memo[node].unwrap_or(0)
    }
}

/// Ports of `node` other than `parent` that lead to unvisited nodes.
fn unvisited_ports(graph: &Graph, node: NodeId, parent: Option<Port>, visited: &[bool]) -> Vec<Port> {
    graph
        .child_ports(node, parent)
        .into_iter()
        .filter(|&port| !visited[graph.adjacent_node_from_port(node, port)])
        .collect()
}

/// Splits `robot_count` robots proportionally to `boundaries`.
///
/// Each port gets `floor(robot_count * boundary / total)`; the rounding
/// remainder goes to the port with the largest boundary, the first one on
/// ties. Returns `None` when there is no boundary at all.
pub fn distribute(robot_count: usize, boundaries: &[u64]) -> Option<Vec<usize>> {
    let total: u128 = boundaries.iter().map(|&boundary| u128::from(boundary)).sum();
    if total == 0 {
        return None;
    }

    let robots = robot_count as u128;
    let mut allotments: Vec<usize> = boundaries
        .iter()
        .map(|&boundary| (robots * u128::from(boundary) / total) as usize)
        .collect();

    let assigned: usize = allotments.iter().sum();
    let mut largest = 0;
    for (index, &boundary) in boundaries.iter().enumerate() {
        if boundary > boundaries[largest] {
            largest = index;
        }
    }
    allotments[largest] += robot_count - assigned;
    Some(allotments)
}

/// Plans one step for every robot.
///
/// Visited nodes are processed in increasing id order. Robots at a node are
/// handed out in their roster order: the first `k0` take the first child
/// port, the next `k1` the second, and so on. Robots at a node without
/// boundary stay put.
pub(crate) fn plan(graph: &Graph, robots: &[Robot], visited: &[bool], ports: &SpanningPorts) -> Vec<Plan> {
    let mut plans = vec![Plan::Stay; robots.len()];
    let mut occupants: Vec<Vec<usize>> = vec![Vec::new(); graph.node_count()];
    let mut memo = vec![None; graph.node_count()];
    for (index, robot) in robots.iter().enumerate() {
        occupants[robot.current_node()].push(index);
    }

    for node in 0..graph.node_count() {
        if !visited[node] || occupants[node].is_empty() {
            continue;
        }
        let children = ports.child_ports(node).unwrap_or_default();
        let boundaries: Vec<u64> = children
            .iter()
            .map(|&port| {
                let child = graph.adjacent_node_from_port(node, port);
                ports.memoized_boundary(graph, visited, child, &mut memo)
            })
            .collect();

        let Some(allotments) = distribute(occupants[node].len(), &boundaries) else {
            continue;
        };

        let mut robots_here = occupants[node].iter();
        for (&port, &allotted) in children.iter().zip(&allotments) {
            for &robot in robots_here.by_ref().take(allotted) {
                plans[robot] = Plan::Move(port);
            }
        }
    }
    plans
}
