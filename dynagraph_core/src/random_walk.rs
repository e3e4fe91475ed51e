//! Random-walk planning shared by the dispersion and exploration strategies.

use rand::Rng;

use crate::coordinator::Plan;
use crate::graph::Graph;
use crate::robot::Robot;

/// Picks a uniformly random port for every active robot.
///
/// Blocked ports are candidates too; a blocked pick is recorded when the
/// move is applied, and the robot draws afresh next step. A robot on a node
/// without ports is discarded.
pub(crate) fn plan<R: Rng + ?Sized>(graph: &Graph, robots: &[Robot], rng: &mut R) -> Vec<Plan> {
    robots
        .iter()
        .map(|robot| {
            if !robot.is_active() {
                return Plan::Stay;
            }
            match graph.number_of_ports(robot.current_node()) {
                0 => Plan::Discard,
                ports => Plan::Move(rng.gen_range(0..ports)),
            }
        })
        .collect()
}
