//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::Output;
use super::{recipe, watch};
use crate::domain::DisplayFormat;
use crate::recipemd::SerializeOptions;
use crate::storage::{Config, LocalFs, OutputFormat, RecipeStore};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(author, version, about = "Keep a folder of RecipeMD recipes in order")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Recipe folder (defaults to the configured library, then the current directory)
    #[arg(long, short = 'd', global = true, env = "SHELF_LIBRARY")]
    pub dir: Option<PathBuf>,

    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List recipes in the folder
    List {
        /// Only recipes carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show a recipe
    ///
    /// Examples:
    ///   shelf show pancakes.md
    ///   shelf show "Pancakes" --scale 2
    ///   shelf show pancakes.md --yield "12 pancakes" --amounts fraction
    Show {
        /// File name, path or title
        recipe: String,

        /// Multiply every amount by this factor
        #[arg(long, conflicts_with = "target_yield")]
        scale: Option<f64>,

        /// Scale to reach this yield, e.g. "8 servings"
        #[arg(long = "yield", value_name = "AMOUNT")]
        target_yield: Option<String>,

        /// How to print amounts (original, decimal, fraction)
        #[arg(long)]
        amounts: Option<DisplayFormat>,
    },

    /// Check recipes for parse errors
    Check {
        /// Files to check (defaults to every recipe in the folder)
        files: Vec<PathBuf>,
    },

    /// Copy a RecipeMD file into the folder under a generated name
    Add {
        /// RecipeMD file to import
        source: PathBuf,
    },

    /// Rewrite a recipe in canonical RecipeMD form
    Fmt {
        /// File name, path or title
        recipe: String,

        /// Overwrite even if the file changed since it was read
        #[arg(long)]
        force: bool,
    },

    /// Delete a recipe
    Rm {
        /// File name, path or title
        recipe: String,
    },

    /// Print the file name a new recipe with this title would get
    Slug {
        /// Recipe title
        title: String,
    },

    /// Watch the folder and rescan when recipes change
    Watch,
}

/// Settings shared by every command
pub(crate) struct Session {
    pub output: Output,
    pub config: Config,
    pub library: PathBuf,
}

impl Session {
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            amount_format: self.config.amount_format,
            yield_format: self.config.amount_format,
        }
    }

    /// Opens and scans the recipe folder
    pub fn open_store(&self) -> Result<RecipeStore<LocalFs>> {
        let mut store =
            RecipeStore::new(LocalFs, &self.library).with_options(self.serialize_options());
        let report = store
            .rescan()
            .with_context(|| format!("Failed to load recipes from {}", self.library.display()))?;
        self.output.verbose_ctx(
            "store",
            &format!(
                "Scanned {}: {} parsed, {} failed",
                self.library.display(),
                report.parsed,
                report.failed
            ),
        );
        Ok(store)
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;
    let format = cli.format.unwrap_or(config.output);
    let output = Output::new(format, cli.verbose);
    let library = config.resolve_library(cli.dir.as_deref());

    output.verbose(&format!("Using recipe folder {}", library.display()));

    let session = Session {
        output,
        config,
        library,
    };

    match cli.command {
        Commands::List { tag } => recipe::list(&session, tag.as_deref()),
        Commands::Show {
            recipe: name,
            scale,
            target_yield,
            amounts,
        } => recipe::show(&session, &name, scale, target_yield.as_deref(), amounts),
        Commands::Check { files } => recipe::check(&session, &files),
        Commands::Add { source } => recipe::add(&session, &source),
        Commands::Fmt {
            recipe: name,
            force,
        } => recipe::format(&session, &name, force),
        Commands::Rm { recipe: name } => recipe::remove(&session, &name),
        Commands::Slug { title } => recipe::slug(&session, &title),
        Commands::Watch => watch::run(&session),
    }
}
