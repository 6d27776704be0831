use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use gridfill::errors::GridError;
use gridfill::grid::Crossword;
use gridfill::render;
use gridfill::solver::Solver;
use gridfill::word_list::WordList;

/// Crossword grid filler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the structure file ('_' marks a fillable cell)
    structure: PathBuf,

    /// Path to the word list file (one word per line)
    words: PathBuf,

    /// Optional path to write the rendered solution to
    output: Option<PathBuf>,
}

/// Entry point of the gridfill CLI.
///
/// Delegates to [`try_main`], catching any errors and printing them
/// in a user-friendly way before exiting with code 1.
fn main() -> ExitCode {
    // Set up logging
    let debug_enabled = std::env::var("GRIDFILL_DEBUG").is_ok();
    gridfill::log::init_logger(debug_enabled);

    log::info!("Starting gridfill (build {})", env!("GIT_HASH"));

    match try_main() {
        Ok(true) => ExitCode::SUCCESS,
        // Unsatisfiable puzzles are not errors, but scripts still want a
        // nonzero exit to detect them.
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            // Print the error message to stderr, with detailed formatting if
            // it's a structure error
            if let Some(grid_err) = e.downcast_ref::<GridError>() {
                eprintln!("Error: {}", grid_err.display_detailed());
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Core application logic for the gridfill CLI.
///
/// Returns `Ok(true)` when a solution was found and rendered, `Ok(false)`
/// when the puzzle is unsatisfiable.
fn try_main() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let structure = std::fs::read_to_string(&cli.structure)?;
    let crossword = Crossword::parse(&structure)?;
    let word_list = WordList::load_from_path(&cli.words)?;
    log::info!(
        "loaded structure ({}x{}, {} slots) and {} words",
        crossword.height(),
        crossword.width(),
        crossword.slot_count(),
        word_list.len()
    );

    let start = Instant::now();
    let mut solver = Solver::new(&crossword, &word_list);
    let assignment = solver.solve();
    log::info!("search finished in {:?}", start.elapsed());

    match assignment {
        None => {
            println!("No solution.");
            Ok(false)
        }
        Some(assignment) => {
            let rendered = render::render_text(&crossword, &assignment);
            print!("{rendered}");
            if let Some(path) = cli.output {
                std::fs::write(&path, rendered)?;
                log::info!("solution written to {}", path.display());
            }
            Ok(true)
        }
    }
}
