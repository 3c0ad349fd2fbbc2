//! shelf - manage a folder of RecipeMD recipes

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = recipe_shelf::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
