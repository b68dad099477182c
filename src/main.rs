//! Exact-cover Tiling Solver
//!
//! Places a set of shapes onto a grid with blocked cells so that no shapes
//! overlap, printing every solution found. Puzzles come from a text file or
//! the built-in catalogue; solutions can be appended to a results file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use tiler::pieces::{self, BUILTIN_PUZZLES};
use tiler::{persistence, Puzzle, PuzzleError, SearchOptions};

/// Solves exact-cover tiling puzzles.
#[derive(Parser)]
#[command(name = "tiler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle and print its solutions.
    Solve(SolveArgs),
    /// List the built-in puzzles.
    List,
    /// Show the number of solutions in a results file.
    Count {
        /// Results file written by `solve --output`.
        results: PathBuf,
    },
    /// Print the solutions in a results file.
    Show {
        /// Results file written by `solve --output`.
        results: PathBuf,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// Puzzle file to solve.
    #[arg(required_unless_present = "builtin", conflicts_with = "builtin")]
    puzzle: Option<PathBuf>,
    /// Solve a built-in puzzle instead of a file.
    #[arg(long, short)]
    builtin: Option<String>,
    /// Stop after this many solutions.
    #[arg(long, short = 'n')]
    limit: Option<usize>,
    /// Assume holes larger than every remaining shape can be filled.
    #[arg(long)]
    random_shape_mode: bool,
    /// Skip the hole analysis after each placement.
    #[arg(long)]
    no_hole_pruning: bool,
    /// Skip checking that every remaining shape still fits somewhere.
    #[arg(long)]
    no_fit_pruning: bool,
    /// Append solutions to this results file.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Only print the number of solutions.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Solve(args)) => run_solve(&args),
        Some(Command::Count { results }) => run_count(&results),
        Some(Command::Show { results }) => run_show(&results),
        Some(Command::List) | None => run_list(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Reads the puzzle named by the arguments.
fn load_puzzle(args: &SolveArgs) -> tiler::Result<Puzzle> {
    let puzzle: Puzzle = match (&args.puzzle, &args.builtin) {
        (_, Some(name)) => pieces::builtin(name)?,
        (Some(path), None) => std::fs::read_to_string(path)
            .map_err(|source| PuzzleError::FileSystem {
                path: path.clone(),
                operation: "read",
                source,
            })?
            .parse()?,
        (None, None) => {
            return Err(PuzzleError::UnknownPuzzle {
                name: String::new(),
            })
        }
    };

    Ok(if args.random_shape_mode {
        puzzle.with_random_shape_mode(true)
    } else {
        puzzle
    })
}

/// Solves a puzzle, printing and optionally recording each solution.
fn run_solve(args: &SolveArgs) -> tiler::Result<()> {
    let puzzle = load_puzzle(args)?;
    if puzzle.shape_area() != puzzle.free_cells() {
        log::warn!(
            "shapes cover {} cells but the grid has {} free cells",
            puzzle.shape_area(),
            puzzle.free_cells()
        );
    }

    let options = SearchOptions {
        fit_pruning: !args.no_fit_pruning,
        hole_pruning: !args.no_hole_pruning,
    };
    let mut results = args
        .output
        .as_deref()
        .map(persistence::SolutionLog::open)
        .transpose()?;

    let mut solutions = puzzle.solve_with(options);
    let mut found = 0;
    for grid in solutions.by_ref().take(args.limit.unwrap_or(usize::MAX)) {
        found += 1;
        if !args.quiet {
            println!("Solution {found}:\n{grid}");
        }
        if let Some(log) = results.as_mut() {
            log.record(&grid)?;
        }
    }

    println!("Found {found} solutions");
    if let Some(log) = &results {
        println!("Wrote {} ({} solutions total)", log.path().display(), log.written());
    }
    log::info!("search statistics: {:?}", solutions.stats());
    Ok(())
}

/// Prints the built-in puzzle names with their size.
fn run_list() -> tiler::Result<()> {
    for (name, _) in BUILTIN_PUZZLES {
        let puzzle = pieces::builtin(name)?;
        println!(
            "{name:<12} {}x{} grid, {} shapes",
            puzzle.grid().rows(),
            puzzle.grid().cols(),
            puzzle.shapes().len()
        );
    }
    Ok(())
}

/// Prints the number of solutions in a results file.
fn run_count(results: &Path) -> tiler::Result<()> {
    println!("{} solutions", persistence::count(results)?);
    Ok(())
}

/// Prints every solution in a results file.
fn run_show(results: &Path) -> tiler::Result<()> {
    let solutions = persistence::load_all(results)?;
    for (i, grid) in solutions.iter().enumerate() {
        println!("Solution {}:\n{grid}", i + 1);
    }
    println!("Loaded {} solutions", solutions.len());
    Ok(())
}
