//! Example solving a puzzle read from a file or stdin.
//!
//! The puzzle format is one row per line, with the default alphabet for
//! the grid size (`1-9` then `A-W`) and `.` for unknown cells.
//!
//! # Usage
//!
//! Solve a standard 9×9 puzzle from stdin:
//!
//! ```sh
//! cargo run --example solve_puzzle < puzzle.txt
//! ```
//!
//! Solve a 12×12 puzzle with 3×4 regions:
//!
//! ```sh
//! cargo run --example solve_puzzle -- --region-height 3 --region-width 4 puzzle12.txt
//! ```
//!
//! Enumerate every solution of an underconstrained puzzle, with a
//! per-solution time budget:
//!
//! ```sh
//! cargo run --example solve_puzzle -- -n 0 --time-limit 30 puzzle.txt
//! ```

use std::{
    fs,
    io::Read as _,
    path::PathBuf,
    process,
    time::Duration,
};

use clap::Parser;
use gridlace_core::{Alphabet, Geometry};
use gridlace_solver::{
    ConstraintGrid, Propagation, PuzzleSolver, SearchConfig, SearchError, SolutionQuota,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Puzzle file; stdin if omitted.
    puzzle: Option<PathBuf>,

    /// Region height; the grid size is height × width.
    #[arg(long, value_name = "CELLS", default_value_t = 3)]
    region_height: u8,

    /// Region width.
    #[arg(long, value_name = "CELLS", default_value_t = 3)]
    region_width: u8,

    /// Wall-time limit per solution, in seconds.
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<u64>,

    /// Number of solutions to search for (0 = all).
    #[arg(short = 'n', long, default_value_t = 1)]
    solutions: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(message) = run(&args) {
        eprintln!("{message}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let input = match &args.puzzle {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("stdin: {e}"))?;
            buffer
        }
    };
    let rows: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();

    let geometry = Geometry::rectangular(args.region_height, args.region_width)
        .map_err(|e| e.to_string())?;
    let alphabet = Alphabet::for_size(geometry.size()).map_err(|e| e.to_string())?;
    let grid =
        ConstraintGrid::from_givens(geometry, alphabet, &rows).map_err(|e| e.to_string())?;

    if grid.is_end_state() {
        println!("Resolved by propagation alone, no search needed:");
        println!("{grid}");
        return Ok(());
    }

    let mut config = SearchConfig::new();
    if let Some(seconds) = args.time_limit {
        config = config.time_limit(Duration::from_secs(seconds));
    }
    let solver = PuzzleSolver::with_config(config);
    let quota = if args.solutions == 0 {
        SolutionQuota::All
    } else {
        SolutionQuota::AtMost(args.solutions)
    };

    let mut search = solver.search(grid.clone(), quota);
    let mut found = 0usize;
    for outcome in search.by_ref() {
        match outcome {
            Ok(moves) => {
                found += 1;
                let mut solved = grid.clone();
                for m in &moves {
                    solved
                        .apply(*m, Propagation::Full)
                        .map_err(|e| e.to_string())?;
                }
                println!("Solution {found} ({} moves):", moves.len());
                println!("{solved}");
            }
            Err(SearchError::TimeLimitExceeded { limit }) => {
                println!("Timed out after {limit:?}; keeping {found} solution(s).");
                break;
            }
            Err(fault) => return Err(fault.to_string()),
        }
    }

    let stats = search.stats();
    if found == 0 {
        if search.exhausted() {
            println!("No solution exists.");
        } else {
            println!("No solution found.");
        }
    } else if search.exhausted() {
        println!("Search space exhausted; {found} solution(s) in total.");
    }

    let elapsed = stats.elapsed();
    println!(
        "Stats: {} states expanded, {} moves examined, max queue {}, {:.2?} elapsed",
        stats.iterations(),
        stats.moves_examined(),
        stats.max_queue_len(),
        elapsed,
    );
    if stats.moves_examined() > 10 {
        let per_move = elapsed.as_secs_f64() * 1000.0
            / u32::try_from(stats.moves_examined()).map_or(f64::NAN, f64::from);
        println!("       {per_move:.3} msec/move");
    }
    Ok(())
}
