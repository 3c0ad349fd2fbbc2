//! # Command-Line Interface
//!
//! The `shelf` command for managing a folder of RecipeMD recipes.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `list` | Recipes in the folder, with tags and broken files |
//! | `show` | One recipe, optionally scaled by factor or to a yield |
//! | `check` | Report files that fail to parse |
//! | `add` | Import a RecipeMD file under a generated file name |
//! | `fmt` | Rewrite a recipe in canonical form |
//! | `rm` | Delete a recipe |
//! | `slug` | Preview the file name for a title |
//! | `watch` | Rescan whenever the folder changes |
//!
//! ## Recipe Folder
//!
//! Chosen by `--dir`, then `SHELF_LIBRARY`, then `library` in the config
//! file, then the current directory.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! shelf --verbose list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod recipe;
mod watch;

pub use app::{run, Cli, Commands};
pub use output::Output;
