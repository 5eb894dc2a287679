use bubble_burst::grid::Grid;
use bubble_burst::playout::greedy;
use bubble_burst::search::{Search, SearchReport, Traversal, DEFAULT_DEPTH_PENALTY};
use bubble_burst::strategy::Strategy;
use bubble_burst::utils::init_tracing;
use bubble_burst::Error;
use clap::Parser;
use rayon::prelude::*;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compare strategies and traversals on seeded boards", long_about = None)]
struct Args {
    /// Number of random boards to evaluate
    #[clap(short = 'n', long, default_value_t = 20)]
    boards: u64,

    /// Seed of the first board
    #[clap(long, default_value_t = 0)]
    start_seed: u64,

    /// Visit budget given to every search
    #[clap(short, long, default_value_t = 20_000)]
    budget: usize,

    /// Depth penalty for priority traversal
    #[clap(short, long, default_value_t = DEFAULT_DEPTH_PENALTY)]
    depth_penalty: f64,

    #[clap(long, default_value_t = 10)]
    width: usize,

    #[clap(long, default_value_t = 10)]
    height: usize,

    #[clap(long, default_value_t = 5)]
    colors: usize,

    /// Print one JSON report per line instead of a table
    #[clap(long)]
    json: bool,

    /// Exit with a failure status if priority ever scores below
    /// breadth-first on a board
    #[clap(long)]
    fail_on_regression: bool,
}

struct BoardResult {
    seed: u64,
    reports: Vec<SearchReport>,
    regressions: Vec<String>,
}

fn evaluate_board(args: &Args, seed: u64) -> Result<BoardResult, Error> {
    let grid = Grid::random(args.width, args.height, args.colors, seed)?;
    let priority = Traversal::Priority {
        depth_penalty: args.depth_penalty,
    };

    let mut reports = Vec::new();
    let mut regressions = Vec::new();
    for strategy in Strategy::builtins() {
        reports.push(greedy(grid.clone(), &strategy)?);

        let bfs = Search::new(&strategy, Traversal::BreadthFirst, args.budget).run(grid.clone())?;
        let best_first = Search::new(&strategy, priority, args.budget).run(grid.clone())?;
        if best_first.best_score < bfs.best_score {
            regressions.push(format!(
                "{}: priority {} < breadth-first {}",
                strategy, best_first.best_score, bfs.best_score
            ));
        }
        reports.push(bfs);
        reports.push(best_first);
    }

    Ok(BoardResult {
        seed,
        reports,
        regressions,
    })
}

fn print_table(results: &[BoardResult]) {
    println!(
        "{:<6} {:<50} {:<28} {:>8} {:>9} {:>6} {:>9}",
        "seed", "strategy", "traversal", "score", "visited", "moves", "ms"
    );
    for result in results {
        for report in &result.reports {
            println!(
                "{:<6} {:<50} {:<28} {:>8} {:>9} {:>6} {:>9}",
                result.seed,
                report.strategy,
                report.traversal.to_string(),
                report.best_score,
                report.nodes_visited,
                report.moves.len(),
                report.elapsed.as_millis()
            );
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let seeds = args.start_seed..args.start_seed + args.boards;
    let results: Result<Vec<BoardResult>, Error> = seeds
        .into_par_iter()
        .map(|seed| evaluate_board(&args, seed))
        .collect();

    let results = match results {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        for report in results.iter().flat_map(|r| &r.reports) {
            match serde_json::to_string(report) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Failed to encode report: {}", e),
            }
        }
    } else {
        print_table(&results);
    }

    let mut regressed = 0;
    for result in &results {
        for regression in &result.regressions {
            eprintln!("Seed {}: {}", result.seed, regression);
            regressed += 1;
        }
    }
    if regressed > 0 {
        eprintln!(
            "{} of {} strategy runs scored lower under priority than breadth-first",
            regressed,
            results.len() * Strategy::builtins().len()
        );
    }
    if regressed > 0 && args.fail_on_regression {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
