//! Robots and their movement traces.

use serde::{Deserialize, Serialize};

use crate::graph::{Graph, NodeId, Port};

/// Unique, monotonically increasing robot identifier.
pub type RobotId = u64;

/// Whether a random-walk robot still moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotState {
    /// Still moving
    Active,

    /// Retired (claimed a node or got stuck)
    Discarded,
}

/// One entry of a robot's execution trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Traversal {
    /// Moved through this port
    Moved(Port),

    /// Tried this port but the edge was blocked
    Blocked(Port),
}

impl Traversal {
    /// Offset separating blocked attempts from real ports in the integer code.
    pub const BLOCKED_OFFSET: i64 = 100;

    /// Integer encoding: `port` for a move, `-port - 100` for a blocked attempt.
    pub fn code(&self) -> i64 {
        match *self {
            Traversal::Moved(port) => port as i64,
            Traversal::Blocked(port) => -(port as i64) - Self::BLOCKED_OFFSET,
        }
    }

    /// Decodes an integer trace entry. Values in `(-100, 0)` are invalid.
    pub fn from_code(code: i64) -> Option<Self> {
        if code >= 0 {
            Some(Traversal::Moved(code as Port))
        } else if code <= -Self::BLOCKED_OFFSET {
            Some(Traversal::Blocked((-(code + Self::BLOCKED_OFFSET)) as Port))
        } else {
            None
        }
    }

    /// Returns true if this entry records an actual move.
    pub fn is_move(&self) -> bool {
        matches!(self, Traversal::Moved(_))
    }
}

/// A mobile agent walking the graph.
///
/// Robots are owned by the coordinator that created them. The trace is
/// append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    id: RobotId,
    start_node: NodeId,
    current_node: NodeId,
    trace: Vec<Traversal>,
    state: RobotState,
}

impl Robot {
    /// Creates an active robot at `start_node`.
    pub fn new(id: RobotId, start_node: NodeId) -> Self {
        Self {
            id,
            start_node,
            current_node: start_node,
            trace: Vec::new(),
            state: RobotState::Active,
        }
    }

    /// Robot identifier.
    pub fn id(&self) -> RobotId {
        self.id
    }

    /// Node the robot was created at.
    pub fn start_node(&self) -> NodeId {
        self.start_node
    }

    /// Node the robot currently occupies.
    pub fn current_node(&self) -> NodeId {
        self.current_node
    }

    /// Random-walk state. Global-communication robots are never discarded.
    pub fn state(&self) -> RobotState {
        self.state
    }

    /// Returns true unless the robot was discarded.
    pub fn is_active(&self) -> bool {
        self.state == RobotState::Active
    }

    /// Execution trace in its integer encoding.
    pub fn ports_traversed(&self) -> Vec<i64> {
        self.trace.iter().map(Traversal::code).collect()
    }

    /// Number of successful moves.
    pub fn move_count(&self) -> usize {
        self.trace.iter().filter(|t| t.is_move()).count()
    }

    /// Number of blocked attempts.
    pub fn blocked_count(&self) -> usize {
        self.trace.len() - self.move_count()
    }

    /// Reconstructs the physical path by replaying moves from the start node.
    ///
    /// Reshuffling never changes topology, so any graph state of the run
    /// (live or historical) replays the same path.
    pub fn node_path(&self, graph: &Graph) -> Vec<NodeId> {
        let mut path = vec![self.start_node];
        let mut node = self.start_node;
        for traversal in &self.trace {
            if let Traversal::Moved(port) = *traversal {
                node = graph.adjacent_node_from_port(node, port);
                path.push(node);
            }
        }
        path
    }

    pub(crate) fn record_move(&mut self, port: Port, destination: NodeId) {
        self.trace.push(Traversal::Moved(port));
        self.current_node = destination;
    }

    pub(crate) fn record_blocked(&mut self, port: Port) {
        self.trace.push(Traversal::Blocked(port));
    }

    pub(crate) fn discard(&mut self) {
        self.state = RobotState::Discarded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator;
    use proptest::prelude::*;

    #[test]
    fn test_traversal_codes() {
        assert_eq!(Traversal::Moved(0).code(), 0);
        assert_eq!(Traversal::Moved(3).code(), 3);
        assert_eq!(Traversal::Blocked(0).code(), -100);
        assert_eq!(Traversal::Blocked(2).code(), -102);

        assert_eq!(Traversal::from_code(-102), Some(Traversal::Blocked(2)));
        assert_eq!(Traversal::from_code(-1), None);
        assert_eq!(Traversal::from_code(-99), None);
    }

    #[test]
    fn test_node_path_skips_blocked() {
        let graph = generator::path(4, false);
        let mut robot = Robot::new(0, 0);

        robot.record_move(0, 1);
        robot.record_blocked(1);
        robot.record_move(1, 2);

        assert_eq!(robot.ports_traversed(), vec![0, -101, 1]);
        assert_eq!(robot.node_path(&graph), vec![0, 1, 2]);
        assert_eq!(robot.current_node(), 2);
        assert_eq!(robot.move_count(), 2);
        assert_eq!(robot.blocked_count(), 1);
    }

    #[test]
    fn test_discard() {
        let mut robot = Robot::new(5, 3);
        assert!(robot.is_active());
        robot.discard();
        assert_eq!(robot.state(), RobotState::Discarded);
        assert_eq!(robot.id(), 5);
        assert_eq!(robot.start_node(), 3);
    }

    proptest! {
        #[test]
        fn prop_trace_codes_invert(port in 0usize..10_000, blocked in any::<bool>()) {
            let traversal = if blocked { Traversal::Blocked(port) } else { Traversal::Moved(port) };
            prop_assert_eq!(Traversal::from_code(traversal.code()), Some(traversal));
            prop_assert_eq!(traversal.code() < 0, blocked);
        }
    }
}
