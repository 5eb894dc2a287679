use bubble_burst::config::SolverConfig;
use bubble_burst::grid::Grid;
use bubble_burst::search::{SearchReport, Traversal, DEFAULT_DEPTH_PENALTY};
use bubble_burst::strategy::Strategy;
use bubble_burst::utils::{init_tracing, load_grid};
use bubble_burst::Error;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    BreadthFirst,
    Priority,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the board file (one row per line, `RGBYP` and `.`)
    board_file: Option<PathBuf>,

    /// Generate a random board from this seed instead of reading a file
    #[clap(long, conflicts_with = "board_file")]
    seed: Option<u64>,

    /// Width of a generated board
    #[clap(long, default_value_t = 10)]
    width: usize,

    /// Height of a generated board
    #[clap(long, default_value_t = 10)]
    height: usize,

    /// Number of colors on a generated board
    #[clap(long, default_value_t = 5)]
    colors: usize,

    /// TOML solver config; flags below override its values
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of nodes to visit
    #[clap(short, long)]
    budget: Option<usize>,

    /// top-k | least-common | all | singleton-penalty
    #[clap(short, long)]
    strategy: Option<String>,

    /// Traversal discipline
    #[clap(short, long, value_enum)]
    mode: Option<Mode>,

    /// Depth penalty for priority traversal
    #[clap(short, long)]
    depth_penalty: Option<f64>,

    /// Number of search workers
    #[clap(short, long)]
    workers: Option<usize>,

    /// Print the report as JSON instead of text
    #[clap(long)]
    json: bool,
}

fn build_config(args: &Args) -> Result<SolverConfig, Error> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };

    if let Some(budget) = args.budget {
        config.visit_budget = budget;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(name) = &args.strategy {
        config.strategy = Strategy::from_name(name).ok_or_else(|| Error::InvalidConfig {
            message: format!("unknown strategy '{}'", name),
        })?;
    }

    let current_penalty = match config.traversal {
        Traversal::Priority { depth_penalty } => depth_penalty,
        Traversal::BreadthFirst => DEFAULT_DEPTH_PENALTY,
    };
    match (args.mode, args.depth_penalty) {
        (Some(Mode::BreadthFirst), _) => config.traversal = Traversal::BreadthFirst,
        (Some(Mode::Priority), penalty) => {
            config.traversal = Traversal::Priority {
                depth_penalty: penalty.unwrap_or(current_penalty),
            }
        }
        (None, Some(depth_penalty)) => {
            if let Traversal::Priority { .. } = config.traversal {
                config.traversal = Traversal::Priority { depth_penalty };
            }
        }
        (None, None) => {}
    }

    config.validate()?;
    Ok(config)
}

fn read_grid(args: &Args) -> Result<Grid, Error> {
    match (&args.board_file, args.seed) {
        (Some(path), _) => load_grid(path),
        (None, seed) => Grid::random(args.width, args.height, args.colors, seed.unwrap_or(0)),
    }
}

fn print_report(report: &SearchReport) {
    println!("Strategy: {}", report.strategy);
    println!("Traversal: {}", report.traversal);
    println!(
        "Visited {} nodes in {} ms ({}), {} left on the frontier\n",
        report.nodes_visited,
        report.elapsed.as_millis(),
        report.termination,
        report.frontier_remaining
    );

    println!("Moves ({}):", report.moves.len());
    if report.moves.is_empty() {
        println!("  No moves made.");
    }
    for (i, mv) in report.moves.iter().enumerate() {
        println!("  Move {}: {}", i + 1, mv);
    }
    println!("Best score: {}\n", report.best_score);
    println!("Final board state:\n{}\n", report.final_grid().to_string_with_highlight(None));
}

fn run(args: &Args) -> Result<(), Error> {
    let config = build_config(args)?;
    let grid = read_grid(args)?;

    if !args.json {
        println!("Initial board state:\n{}\n", grid.to_string_with_highlight(None));
    }

    let report = config.search(&config.strategy).run(grid)?;

    if args.json {
        match serde_json::to_string(&report) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Failed to encode report: {}", e),
        }
    } else {
        print_report(&report);
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
