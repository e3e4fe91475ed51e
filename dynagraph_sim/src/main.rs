//! Dynagraph simulator CLI
//!
//! Runs a single configured exploration, or preset scenarios across seeds.

use clap::Parser;
use dynagraph_sim::scenarios::ScenarioId;
use dynagraph_sim::{ScenarioResult, ScenarioRunner, SimConfig, SimError, SimWorld};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Robot exploration on graphs with intermittently failing edges
#[derive(Parser, Debug)]
#[command(name = "dynagraph-sim")]
#[command(about = "Simulate robot exploration and dispersion on dynamic graphs", long_about = None)]
struct Args {
    /// Master seed for determinism
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Preset scenario to run instead of a configured run (name or "all")
    #[arg(short = 'S', long)]
    scenario: Option<String>,

    /// Number of consecutive seeds to run scenarios with
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Graph family (path, cycle, complete, arbitrary_tree, binary_tree, erdos_renyi)
    #[arg(short, long, default_value = "path")]
    graph: String,

    /// Number of nodes
    #[arg(short, long, default_value = "10")]
    nodes: usize,

    /// Pair inclusion probability for Erdős–Rényi graphs
    #[arg(long, default_value = "0.3")]
    edge_probability: f64,

    /// Generate one-way edges
    #[arg(long)]
    directed: bool,

    /// Allow self-loops
    #[arg(long)]
    self_loops: bool,

    /// Accept disconnected Erdős–Rényi graphs
    #[arg(long)]
    allow_disconnected: bool,

    /// Attempt budget when redrawing for connectivity
    #[arg(long, default_value = "100")]
    max_attempts: u32,

    /// Strategy (dispersion, exploration, tree, arbitrary)
    #[arg(long, default_value = "exploration")]
    strategy: String,

    /// Robots per batch
    #[arg(short, long, default_value = "1")]
    robots: usize,

    /// Start node for random-walk robots
    #[arg(long, default_value = "0")]
    start: usize,

    /// Steps between reshuffles, or "inf"
    #[arg(short, long, default_value = "1")]
    lambda: String,

    /// Probability an edge survives a reshuffle
    #[arg(long, default_value = "0.8")]
    survival: f64,

    /// Steps between robot injections for global strategies (0 = never)
    #[arg(long, default_value = "1")]
    injection_interval: u64,

    /// Step budget per run
    #[arg(long, default_value = "10000")]
    max_steps: u64,

    /// Include per-robot traces in the summary
    #[arg(long)]
    robots_detail: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

impl Args {
    fn sim_config(&self) -> Result<SimConfig, SimError> {
        let mut config = SimConfig {
            seed: self.seed,
            node_count: self.nodes,
            directed: self.directed,
            self_loops: self.self_loops,
            require_connected: !self.allow_disconnected,
            robot_count: self.robots,
            injection_interval: self.injection_interval,
            max_steps: self.max_steps,
            ..Default::default()
        };
        config.set_graph_kind(&self.graph)?;
        config.set_strategy(&self.strategy)?;
        config.set_edge_probability(self.edge_probability)?;
        config.set_max_generation_attempts(self.max_attempts)?;
        config.set_starting_node(self.start)?;
        config.set_lambda(&self.lambda)?;
        config.set_edge_survival_probability(self.survival)?;
        Ok(config)
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let code = match &args.scenario {
        Some(selector) => run_scenarios(&args, selector),
        None => match run_single(&args) {
            Ok(finished) => i32::from(!finished),
            Err(e) => {
                error!("{}", e);
                1
            }
        },
    };

    // Exit with proper code for CI
    std::process::exit(code);
}

/// Runs the configured simulation once. Returns whether it finished.
fn run_single(args: &Args) -> Result<bool, SimError> {
    let config = args.sim_config()?;
    let mut world = SimWorld::new(config)?;
    let finished = world.run();
    let summary = world.summary(args.robots_detail);

    if args.json {
        println!("{}", summary.to_json()?);
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "{} after {} steps: {}/{} nodes visited ({:.1}%)",
            if finished { "Finished" } else { "Stopped" },
            summary.steps,
            summary.visited_count,
            summary.node_count,
            summary.coverage() * 100.0
        );
        info!(
            "Robots: {} spawned, {} active | blocked moves: {} | reshuffles: {}",
            summary.robot_count, summary.active_robots, summary.blocked_moves, summary.reshuffles
        );
        for robot in &summary.robots {
            info!(
                "  robot {} ({} -> {}): {:?}",
                robot.id, robot.start_node, robot.current_node, robot.ports_traversed
            );
        }
    }
    Ok(finished)
}

/// Runs preset scenarios over consecutive seeds. Returns the exit code.
fn run_scenarios(args: &Args, selector: &str) -> i32 {
    let scenarios: Vec<ScenarioId> = if selector == "all" {
        ScenarioId::all()
    } else {
        match selector.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                eprintln!("Error: {}", e);
                let names: Vec<&str> = ScenarioId::all().iter().map(ScenarioId::name).collect();
                eprintln!("Available scenarios: {}, all", names.join(", "));
                return 1;
            }
        }
    };

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = args.seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed).with_max_steps(args.max_steps);

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED in {} steps", scenario.name(), seed, result.total_steps);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }
            all_results.push(result);
        }
    }

    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "steps": r.total_steps,
                    "visited": r.summary.as_ref().map(|s| s.visited_count),
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize results: {}", e);
                return 1;
            }
        }
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
        }
    }

    i32::from(failed_count > 0)
}
