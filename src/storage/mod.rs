//! # Storage Layer
//!
//! File-backed recipe collection for a folder of RecipeMD files.
//!
//! ## Storage Format
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Recipes | RecipeMD Markdown, UTF-8 | `{library}/{slug}.md` |
//! | Config | TOML | `~/.config/recipe-shelf/config.toml` |
//!
//! ## Consistency
//!
//! - [`RecipeStore`] caches parsed recipes by modification time, so a
//!   rescan only re-parses files that changed
//! - Updates refuse to overwrite files another program changed since they
//!   were read, unless forced
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`RecipeStore`] - Owns a folder and publishes a sorted recipe snapshot
//! - [`FileSystem`] - File access the store goes through ([`LocalFs`], [`MemoryFs`])
//! - [`FolderWatcher`] - Turns folder changes into a [`RescanSignal`]
//! - [`Config`] - User configuration

mod activity;
mod config;
mod error;
pub mod filename;
mod fs;
mod recipe_file;
mod store;
mod watcher;

pub use activity::{ActivityState, BusyGuard, RescanSignal, StoreActivity};
pub use config::{Config, ConfigError, OutputFormat, WatchConfig, CONFIG_ENV};
pub use error::{DeleteError, StoreError, WriteError};
pub use fs::{AccessGuard, FileSystem, LocalFs, MemoryFs};
pub use recipe_file::{fallback_title, RecipeFile};
pub use store::{ConflictPolicy, RecipeStore, ScanReport};
pub use watcher::{FolderWatcher, WatchError};
