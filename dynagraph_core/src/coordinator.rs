//! The step-driven robot coordinator.
//!
//! A [`Coordinator`] owns the graph, its robots and the run history, and
//! advances everything one synchronous step at a time:
//!
//! 1. Every `lambda` steps, snapshot the graph into the history and reshuffle
//!    edge availability.
//! 2. Ask the strategy for a plan for every robot.
//! 3. Apply the plans. A move through a blocked edge is recorded as a blocked
//!    attempt and the robot stays; otherwise it moves and marks its new node
//!    visited.
//! 4. Global-communication strategies inject a fresh batch of robots at the
//!    root.
//! 5. Increment the step counter.
//!
//! There is no concurrency: nothing moves unless the caller calls
//! [`Coordinator::step`] or [`Coordinator::run`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::config::{CoordinatorConfig, StrategyKind};
use crate::error::ConfigError;
use crate::global::{self, SpanningPorts};
use crate::graph::{Graph, NodeId, Port, Vertex};
use crate::random_walk;
use crate::robot::{Robot, RobotId};

/// Root node used by the global-communication strategies.
pub const ROOT: NodeId = 0;

/// What a robot does this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Plan {
    /// Not moving
    Stay,

    /// Try to move through this port
    Move(Port),

    /// Retire the robot (random walk on a node without ports)
    Discard,
}

/// Graph state recorded just before a reshuffle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Step at whose start the snapshot was taken
    pub step_number: u64,

    /// Independent copy of every vertex
    pub nodes: Vec<Vertex>,
}

/// The active strategy together with its private state.
#[derive(Debug, Clone)]
enum Strategy {
    RandomWalkDispersion,
    RandomWalkExploration,
    TreeGlobal(SpanningPorts),
    ArbitraryGlobal(SpanningPorts),
}

/// Owns a graph, a robot roster and the step clock of one simulation.
pub struct Coordinator<R> {
    /// Topology and current edge availability
    graph: Graph,

    /// All robots ever created, in creation order
    robots: Vec<Robot>,

    /// `visited[node]` flips to true once and never back
    visited: Vec<bool>,

    /// Steps completed so far
    step_number: u64,

    /// Snapshots taken before every reshuffle
    history: Vec<GraphSnapshot>,

    /// Fixed configuration
    config: CoordinatorConfig,

    /// Selected strategy
    kind: StrategyKind,

    strategy: Strategy,

    /// Randomness for reshuffles and random walks
    rng: R,

    /// Next robot id
    next_robot_id: RobotId,

    /// Moves attempted through blocked edges
    blocked_moves: u64,
}

impl<R: Rng> Coordinator<R> {
    /// Creates a coordinator and its initial robots.
    ///
    /// Random-walk robots start at `config.starting_node`. The
    /// global-communication strategies always root at node 0; the tree
    /// strategy assumes `graph` is a tree.
    pub fn new(
        graph: Graph,
        kind: StrategyKind,
        config: CoordinatorConfig,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate(graph.node_count())?;

        let start = if kind.uses_global_communication() {
            ROOT
        } else {
            config.starting_node
        };
        let mut visited = vec![false; graph.node_count()];
        visited[start] = true;

        let strategy = match kind {
            StrategyKind::RandomWalkDispersion => Strategy::RandomWalkDispersion,
            StrategyKind::RandomWalkExploration => Strategy::RandomWalkExploration,
            StrategyKind::TreeGlobal => Strategy::TreeGlobal(SpanningPorts::treeify(&graph, ROOT)),
            StrategyKind::ArbitraryGlobal => {
                Strategy::ArbitraryGlobal(SpanningPorts::rooted(&graph, ROOT, &visited))
            }
        };

        info!(
            "Coordinator: {} on {} nodes, {} robots from node {}, lambda={}, survival={}",
            kind,
            graph.node_count(),
            config.robot_count,
            start,
            config.lambda,
            config.edge_survival_probability
        );

        let mut coordinator = Self {
            graph,
            robots: Vec::new(),
            visited,
            step_number: 0,
            history: Vec::new(),
            config,
            kind,
            strategy,
            rng,
            next_robot_id: 0,
            blocked_moves: 0,
        };
        coordinator.spawn_robots(start, coordinator.config.robot_count);
        Ok(coordinator)
    }

    /// Advances the simulation by one step.
    pub fn step(&mut self) {
        if self.config.lambda.is_reshuffle_step(self.step_number) {
            self.reshuffle();
        }

        let plans = match &self.strategy {
            Strategy::RandomWalkDispersion | Strategy::RandomWalkExploration => {
                random_walk::plan(&self.graph, &self.robots, &mut self.rng)
            }
            Strategy::TreeGlobal(ports) | Strategy::ArbitraryGlobal(ports) => {
                global::plan(&self.graph, &self.robots, &self.visited, ports)
            }
        };
        self.apply(plans);

        if self.kind.uses_global_communication() && self.config.injects_at(self.step_number) {
            self.spawn_robots(ROOT, self.config.robot_count);
        }

        self.step_number += 1;
        trace!(
            "Step {} done: {}/{} nodes visited",
            self.step_number,
            self.visited_count(),
            self.graph.node_count()
        );
    }

    /// Steps until the strategy's termination condition holds.
    ///
    /// Never returns if the condition cannot be met (for example exploring a
    /// disconnected graph); use [`Coordinator::run_for`] to bound the run.
    pub fn run(&mut self) -> u64 {
        while !self.is_finished() {
            self.step();
        }
        info!("{} finished after {} steps", self.kind, self.step_number);
        self.step_number
    }

    /// Steps until finished or `max_steps` more steps have run.
    ///
    /// Returns true if the run finished.
    pub fn run_for(&mut self, max_steps: u64) -> bool {
        for _ in 0..max_steps {
            if self.is_finished() {
                break;
            }
            self.step();
        }

        let finished = self.is_finished();
        if finished {
            info!("{} finished after {} steps", self.kind, self.step_number);
        } else {
            warn!(
                "{} still running after {} steps ({}/{} nodes visited)",
                self.kind,
                self.step_number,
                self.visited_count(),
                self.graph.node_count()
            );
        }
        finished
    }

    /// Snapshots the graph and redraws every edge's availability.
    fn reshuffle(&mut self) {
        self.history.push(GraphSnapshot {
            step_number: self.step_number,
            nodes: self.graph.deep_copy_nodes(),
        });
        self.graph
            .set_random_edge_weight_signs(self.config.edge_survival_probability, &mut self.rng);
        debug!("Step {}: edges reshuffled", self.step_number);
    }

    /// Applies one plan per robot, in roster order.
    fn apply(&mut self, plans: Vec<Plan>) {
        for (index, plan) in plans.into_iter().enumerate() {
            let robot = &mut self.robots[index];
            let port = match plan {
                Plan::Stay => continue,
                Plan::Discard => {
                    trace!("Robot {} stuck at node {}, discarded", robot.id(), robot.current_node());
                    robot.discard();
                    continue;
                }
                Plan::Move(port) => port,
            };

            let from = robot.current_node();
            if !self.graph.is_traversable(from, port) {
                robot.record_blocked(port);
                self.blocked_moves += 1;
                trace!("Robot {} blocked at node {} port {}", robot.id(), from, port);
                continue;
            }

            let to = self.graph.adjacent_node_from_port(from, port);
            robot.record_move(port, to);
            let newly_visited = !self.visited[to];
            self.visited[to] = true;
            trace!("Robot {} moved {} -> {} via port {}", robot.id(), from, to, port);

            match &mut self.strategy {
                Strategy::RandomWalkDispersion if newly_visited => robot.discard(),
                Strategy::ArbitraryGlobal(ports) => ports.claim(&self.graph, &self.visited, to, from),
                _ => {}
            }
        }
    }

    fn spawn_robots(&mut self, node: NodeId, count: usize) {
        for _ in 0..count {
            self.robots.push(Robot::new(self.next_robot_id, node));
            self.next_robot_id += 1;
        }
    }

    /// Returns true once the strategy's termination condition holds.
    ///
    /// Random walks stop when every node is visited or no robot is active;
    /// the global strategies stop when every node is visited.
    pub fn is_finished(&self) -> bool {
        let all_visited = self.visited.iter().all(|&v| v);
        match self.strategy {
            Strategy::RandomWalkDispersion | Strategy::RandomWalkExploration => {
                all_visited || self.active_robot_count() == 0
            }
            Strategy::TreeGlobal(_) | Strategy::ArbitraryGlobal(_) => all_visited,
        }
    }
}

impl<R> Coordinator<R> {
    /// The graph being explored.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Every robot created so far, in creation order.
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    /// Robots that have not been discarded.
    pub fn active_robot_count(&self) -> usize {
        self.robots.iter().filter(|r| r.is_active()).count()
    }

    /// Per-node visited flags.
    pub fn visited_nodes(&self) -> &[bool] {
        &self.visited
    }

    /// Number of visited nodes.
    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|&&v| v).count()
    }

    /// Steps completed so far.
    pub fn step_number(&self) -> u64 {
        self.step_number
    }

    /// Snapshots taken before each reshuffle, oldest first.
    pub fn graph_history(&self) -> &[GraphSnapshot] {
        &self.history
    }

    /// Latest snapshot taken at or before `step`.
    pub fn snapshot_at(&self, step: u64) -> Option<&GraphSnapshot> {
        self.history.iter().rev().find(|s| s.step_number <= step)
    }

    /// Moves attempted through blocked edges so far.
    pub fn blocked_moves(&self) -> u64 {
        self.blocked_moves
    }

    /// Configuration the coordinator was built with.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Parent/child ports of the global strategies.
    pub fn spanning_ports(&self) -> Option<&SpanningPorts> {
        match &self.strategy {
            Strategy::TreeGlobal(ports) | Strategy::ArbitraryGlobal(ports) => Some(ports),
            Strategy::RandomWalkDispersion | Strategy::RandomWalkExploration => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lambda;
    use crate::generator;
    use crate::robot::RobotState;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(lambda: Lambda, survival: f64, robots: usize) -> CoordinatorConfig {
        CoordinatorConfig {
            lambda,
            edge_survival_probability: survival,
            robot_count: robots,
            starting_node: 0,
            injection_interval: 1,
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_rejects_bad_starting_node() {
        let graph = generator::path(3, false);
        let bad = CoordinatorConfig {
            starting_node: 3,
            ..Default::default()
        };
        let result = Coordinator::new(graph, StrategyKind::RandomWalkExploration, bad, rng());
        assert!(matches!(result, Err(ConfigError::StartingNodeOutOfRange { node: 3, node_count: 3 })));
    }

    #[test]
    fn test_random_walk_exploration_on_path() {
        let graph = generator::path(5, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::RandomWalkExploration,
            config(Lambda::Infinite, 0.5, 1),
            rng(),
        )
        .unwrap();

        let steps = coordinator.run();

        assert!(coordinator.visited_nodes().iter().all(|&v| v));
        assert!(steps >= 4);
        assert!(coordinator.graph_history().is_empty());
        assert_eq!(coordinator.blocked_moves(), 0);
    }

    #[test]
    fn test_random_walk_path_replays_trace() {
        let graph = generator::cycle(8, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::RandomWalkExploration,
            config(Lambda::steps(2).unwrap(), 0.6, 3),
            rng(),
        )
        .unwrap();
        coordinator.run_for(200);

        for robot in coordinator.robots() {
            let path = robot.node_path(coordinator.graph());
            assert_eq!(path.first(), Some(&robot.start_node()));
            assert_eq!(path.last(), Some(&robot.current_node()));
            assert_eq!(path.len(), robot.move_count() + 1);
            for pair in path.windows(2) {
                assert_eq!(coordinator.graph().distance_between_nodes(pair[0], pair[1]), Some(1));
            }
        }
    }

    #[test]
    fn test_dispersion_claims_one_node_per_robot() {
        let graph = generator::complete_graph(10, false, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::RandomWalkDispersion,
            config(Lambda::Infinite, 1.0, 4),
            rng(),
        )
        .unwrap();

        coordinator.run();

        // Each robot retires on the first new node it reaches
        assert_eq!(coordinator.active_robot_count(), 0);
        assert_eq!(coordinator.visited_count(), 5);
        let mut claimed: Vec<NodeId> = coordinator.robots().iter().map(|r| r.current_node()).collect();
        claimed.sort_unstable();
        claimed.dedup();
        assert_eq!(claimed.len(), 4);
        assert!(!claimed.contains(&0));
        for robot in coordinator.robots() {
            assert_eq!(robot.state(), RobotState::Discarded);
            assert!(robot.move_count() >= 1);
        }
    }

    #[test]
    fn test_exploration_discards_on_dead_end() {
        let graph = generator::path(3, true);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::RandomWalkExploration,
            CoordinatorConfig {
                lambda: Lambda::Infinite,
                starting_node: 2,
                ..Default::default()
            },
            rng(),
        )
        .unwrap();

        coordinator.run();
        assert_eq!(coordinator.step_number(), 1);
        assert_eq!(coordinator.active_robot_count(), 0);
        assert_eq!(coordinator.visited_nodes(), &[false, false, true]);
    }

    #[test]
    fn test_blocked_moves_recorded() {
        let graph = generator::path(4, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::RandomWalkExploration,
            config(Lambda::steps(1).unwrap(), 0.0, 2),
            rng(),
        )
        .unwrap();

        coordinator.run_for(10);

        assert_eq!(coordinator.step_number(), 10);
        assert_eq!(coordinator.blocked_moves(), 20);
        assert_eq!(coordinator.visited_count(), 1);
        for robot in coordinator.robots() {
            assert_eq!(robot.current_node(), 0);
            assert!(robot.ports_traversed().iter().all(|&code| code <= -100));
        }
    }

    #[test]
    fn test_history_snapshots_before_reshuffle() {
        let graph = generator::cycle(6, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::RandomWalkExploration,
            config(Lambda::steps(3).unwrap(), 0.0, 1),
            rng(),
        )
        .unwrap();

        for _ in 0..7 {
            coordinator.step();
        }

        let steps: Vec<u64> = coordinator.graph_history().iter().map(|s| s.step_number).collect();
        assert_eq!(steps, vec![0, 3, 6]);

        // The first snapshot predates any reshuffle: every edge traversable
        let first = &coordinator.graph_history()[0];
        assert!(first.nodes.iter().flat_map(|v| &v.edges).all(|e| e.is_traversable()));
        // Later snapshots saw survival probability 0
        let second = &coordinator.graph_history()[1];
        assert!(second.nodes.iter().flat_map(|v| &v.edges).all(|e| !e.is_traversable()));

        assert_eq!(coordinator.snapshot_at(5).map(|s| s.step_number), Some(3));
        assert_eq!(coordinator.snapshot_at(100).map(|s| s.step_number), Some(6));
    }

    #[test]
    fn test_tree_global_on_three_node_path() {
        let graph = generator::path(3, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::TreeGlobal,
            config(Lambda::Infinite, 1.0, 1),
            rng(),
        )
        .unwrap();

        coordinator.step();
        assert_eq!(coordinator.robots()[0].current_node(), 1);
        assert_eq!(coordinator.visited_nodes(), &[true, true, false]);
        // A fresh robot was injected at the root
        assert_eq!(coordinator.robots().len(), 2);
        assert_eq!(coordinator.robots()[1].current_node(), 0);

        coordinator.step();
        assert_eq!(coordinator.robots()[0].current_node(), 2);
        assert_eq!(coordinator.robots()[1].current_node(), 1);
        assert!(coordinator.is_finished());
        assert_eq!(coordinator.run(), 2);
    }

    #[test]
    fn test_tree_global_explores_binary_tree() {
        let graph = generator::binary_tree(15, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::TreeGlobal,
            config(Lambda::Infinite, 1.0, 4),
            rng(),
        )
        .unwrap();

        // One robot per level-2 node takes the first leaf in step 3, and the
        // robots following behind take the second leaves in step 4
        assert!(coordinator.run_for(10));
        assert_eq!(coordinator.step_number(), 4);
    }

    #[test]
    fn test_tree_global_respects_blocked_edges() {
        let graph = generator::path(3, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::TreeGlobal,
            config(Lambda::steps(1).unwrap(), 0.0, 1),
            rng(),
        )
        .unwrap();

        assert!(!coordinator.run_for(5));
        assert_eq!(coordinator.visited_count(), 1);
        assert_eq!(coordinator.robots()[0].ports_traversed(), vec![-100; 5]);
    }

    #[test]
    fn test_injection_can_be_disabled() {
        let graph = generator::path(4, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::TreeGlobal,
            CoordinatorConfig {
                lambda: Lambda::Infinite,
                robot_count: 1,
                injection_interval: 0,
                ..Default::default()
            },
            rng(),
        )
        .unwrap();

        coordinator.run();
        assert_eq!(coordinator.robots().len(), 1);
        assert_eq!(coordinator.robots()[0].node_path(coordinator.graph()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_arbitrary_global_explores_random_graph() {
        let mut rng = rng();
        let graph = generator::erdos_renyi_random_graph(25, 0.2, false, false, true, 100, &mut rng).unwrap();
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::ArbitraryGlobal,
            config(Lambda::steps(4).unwrap(), 0.8, 3),
            rng,
        )
        .unwrap();

        assert!(coordinator.run_for(10_000));
        let ports = coordinator.spanning_ports().unwrap();
        for node in 0..coordinator.graph().node_count() {
            assert!(ports.is_computed(node));
        }
    }

    #[test]
    fn test_arbitrary_global_parent_points_back() {
        let graph = generator::complete_graph(5, false, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::ArbitraryGlobal,
            config(Lambda::Infinite, 1.0, 4),
            rng(),
        )
        .unwrap();

        // Four boundary ports, four robots: one robot per neighbor
        coordinator.step();
        assert!(coordinator.is_finished());
        let ports = coordinator.spanning_ports().unwrap();
        for node in 1..5 {
            let parent = ports.parent_port(node).unwrap();
            assert_eq!(coordinator.graph().adjacent_node_from_port(node, parent), ROOT);
        }
        // Later claims see their siblings already visited
        assert_eq!(ports.child_ports(1).map(<[Port]>::len), Some(3));
        assert_eq!(ports.child_ports(4), Some(&[][..]));
    }

    #[test]
    fn test_arbitrary_global_finishes_dense_graph() {
        let graph = generator::complete_graph(40, false, false);
        let mut coordinator = Coordinator::new(
            graph,
            StrategyKind::ArbitraryGlobal,
            config(Lambda::Infinite, 1.0, 1),
            rng(),
        )
        .unwrap();

        assert!(coordinator.run_for(100));
        assert_eq!(coordinator.visited_count(), 40);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let graph = generator::arbitrary_tree(30, false, &mut rng);
            let mut coordinator = Coordinator::new(
                graph,
                StrategyKind::RandomWalkExploration,
                config(Lambda::steps(2).unwrap(), 0.7, 2),
                rng,
            )
            .unwrap();
            coordinator.run_for(500);
            (coordinator.step_number(), coordinator.robots().to_vec())
        };

        assert_eq!(run(7), run(7));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_visited_is_monotonic(
            seed in any::<u64>(),
            strategy in prop::sample::select(StrategyKind::all()),
            survival in 0.0f64..=1.0,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let graph = generator::arbitrary_tree(12, false, &mut rng);
            let mut coordinator = Coordinator::new(
                graph,
                strategy,
                config(Lambda::steps(2).unwrap(), survival, 2),
                rng,
            )
            .unwrap();

            let mut previous = coordinator.visited_nodes().to_vec();
            for _ in 0..30 {
                coordinator.step();
                let current = coordinator.visited_nodes();
                for (before, after) in previous.iter().zip(current) {
                    prop_assert!(!before || *after);
                }
                previous = current.to_vec();
            }
        }
    }
}
