//! File-backed recipe collection
//!
//! A [`RecipeStore`] owns one folder of RecipeMD files. It keeps a cache of
//! parsed recipes keyed by path and modification time, so a rescan only
//! re-parses files that changed. The sorted collection is published as an
//! immutable snapshot that is swapped on every mutation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use super::activity::{StoreActivity, RescanSignal};
use super::error::{DeleteError, StoreError, WriteError};
use super::filename;
use super::fs::{AccessGuard, FileSystem, LocalFs};
use super::recipe_file::RecipeFile;
use crate::domain::{Ingredient, Recipe};
use crate::recipemd::{self, ParseError, SerializeOptions};

/// What a rescan did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Files read and run through the parser
    pub parsed: usize,

    /// Files whose cached recipe was reused unchanged
    pub reused: usize,

    /// Cached files that no longer exist
    pub removed: usize,

    /// Files that did not parse cleanly (fallbacks and unreadable files)
    pub failed: usize,

    /// True when the scan was dropped because another one was running
    pub skipped: bool,
}

impl ScanReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Whether [`RecipeStore::update`] checks for changes made by other programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Refuse to write when the file changed since it was read
    #[default]
    Check,

    /// Write regardless
    Overwrite,
}

/// Recipes stored as `.md` files in one folder
pub struct RecipeStore<F: FileSystem = LocalFs> {
    fs: F,
    folder: PathBuf,
    options: SerializeOptions,

    /// Every readable file seen by the last scan or write, including fallbacks
    cache: HashMap<PathBuf, RecipeFile>,

    /// Published snapshot, sorted by title
    recipes: Arc<[RecipeFile]>,

    /// Files that could not be read at all
    errors: BTreeMap<PathBuf, ParseError>,

    activity: StoreActivity,
    rescan_signal: RescanSignal,
}

impl RecipeStore<LocalFs> {
    /// Opens a folder on the local disk and scans it
    pub fn open(folder: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self::new(LocalFs, folder);
        store.rescan()?;
        Ok(store)
    }
}

impl<F: FileSystem> RecipeStore<F> {
    /// Creates an empty store; call [`rescan`](Self::rescan) to load it
    pub fn new(fs: F, folder: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            folder: folder.into(),
            options: SerializeOptions::default(),
            cache: HashMap::new(),
            recipes: Arc::from(Vec::new()),
            errors: BTreeMap::new(),
            activity: StoreActivity::new(),
            rescan_signal: RescanSignal::new(),
        }
    }

    /// Sets how amounts are written by create and update
    pub fn with_options(mut self, options: SerializeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// Snapshot of all recipes, sorted by title
    pub fn recipes(&self) -> Arc<[RecipeFile]> {
        Arc::clone(&self.recipes)
    }

    /// Files that could not be read, by path
    pub fn errors(&self) -> &BTreeMap<PathBuf, ParseError> {
        &self.errors
    }

    pub fn activity(&self) -> &StoreActivity {
        &self.activity
    }

    /// Signal to hand to a watcher; see [`process_pending`](Self::process_pending)
    pub fn rescan_signal(&self) -> RescanSignal {
        self.rescan_signal.clone()
    }

    pub fn get(&self, path: &Path) -> Option<&RecipeFile> {
        self.recipes.iter().find(|file| file.path == path)
    }

    /// Finds a recipe by title (case-insensitive) or by file name
    pub fn find_by_title(&self, title: &str) -> Option<&RecipeFile> {
        let wanted = title.trim().to_lowercase();
        self.recipes
            .iter()
            .find(|file| file.recipe.title.to_lowercase() == wanted)
            .or_else(|| {
                self.recipes
                    .iter()
                    .find(|file| file.file_name().to_lowercase() == wanted)
            })
    }

    /// Recipe an ingredient links to, if it is in this folder
    pub fn resolve_link(&self, ingredient: &Ingredient) -> Option<&RecipeFile> {
        let target = ingredient.linked_recipe.as_deref()?;
        let target = target.replace("%20", " ");
        let name = Path::new(&target)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(target.clone());
        self.find_by_title(&name)
            .or_else(|| self.find_by_title(&ingredient.name))
    }

    /// Rescans if a watcher requested it since the last call
    pub fn process_pending(&mut self) -> Result<Option<ScanReport>, StoreError> {
        if self.rescan_signal.take() {
            self.rescan().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reconciles the collection with the folder.
    ///
    /// Unchanged files reuse their cached recipe. Files that fail to parse
    /// appear as fallbacks titled after the file and are parsed again on
    /// every scan; files that cannot be read go to [`errors`](Self::errors).
    pub fn rescan(&mut self) -> Result<ScanReport, StoreError> {
        let Some(_scanning) = self.activity.begin_scan() else {
            debug!("Scan of {} already running, skipping", self.folder.display());
            return Ok(ScanReport::skipped());
        };

        let access = AccessGuard::acquire(&self.fs, &self.folder).ok_or_else(|| {
            StoreError::FolderNotAccessible {
                path: self.folder.clone(),
            }
        })?;
        if !self.fs.is_dir(&self.folder) {
            return Err(StoreError::FolderNotAccessible {
                path: self.folder.clone(),
            });
        }
        let entries = self
            .fs
            .list(&self.folder)
            .map_err(|source| StoreError::List {
                path: self.folder.clone(),
                source,
            })?;

        let mut report = ScanReport::default();
        let mut files = Vec::new();
        let mut errors = BTreeMap::new();
        let mut seen = HashSet::new();

        for path in entries.into_iter().filter(|p| filename::is_recipe_file(p)) {
            let modified = self.fs.modified(&path);

            if let Some(cached) = self.cache.get(&path) {
                if !cached.is_fallback() && modified.is_some() && cached.modified == modified {
                    debug!("Reusing cached {}", path.display());
                    seen.insert(path);
                    files.push(cached.clone());
                    report.reused += 1;
                    continue;
                }
            }

            let text = match self.fs.read_text(&path) {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    let err = ParseError::from_io(&path, &e);
                    warn!("{}", err);
                    self.cache.remove(&path);
                    errors.insert(path, err);
                    report.failed += 1;
                    continue;
                }
            };

            report.parsed += 1;
            let file = match recipemd::parse(&text) {
                Ok(recipe) => RecipeFile::new(path.clone(), modified, recipe),
                Err(err) => {
                    warn!("Cannot parse {}: {}", path.display(), err);
                    report.failed += 1;
                    RecipeFile::fallback(path.clone(), modified, err)
                }
            };
            self.cache.insert(path.clone(), file.clone());
            seen.insert(path);
            files.push(file);
        }
        drop(access);

        let before = self.cache.len();
        self.cache.retain(|path, _| seen.contains(path));
        report.removed = before - self.cache.len();

        self.errors = errors;
        self.publish(files);

        debug!(
            "Scanned {}: {} parsed, {} reused, {} removed, {} failed",
            self.folder.display(),
            report.parsed,
            report.reused,
            report.removed,
            report.failed
        );
        Ok(report)
    }

    /// Writes a new recipe under a file name derived from its title
    pub fn create(&mut self, recipe: &Recipe) -> Result<RecipeFile, WriteError> {
        let _saving = self.activity.begin_save();
        let text = recipemd::serialize_with(recipe, &self.options)?;

        let access = self.access_for_write()?;
        let existing = self
            .fs
            .list(&self.folder)
            .map_err(|source| WriteError::Write {
                path: self.folder.clone(),
                source,
            })?;
        let names = existing
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());
        let name = filename::generate(&recipe.title, names)?;
        let path = self.folder.join(name);

        self.fs
            .write_atomic(&path, &text)
            .map_err(|source| WriteError::Write {
                path: path.clone(),
                source,
            })?;
        let modified = self.fs.modified(&path);
        drop(access);

        info!("Created {}", path.display());
        Ok(self.store_written(path, modified, &text, recipe))
    }

    /// Overwrites the file behind `original` with `recipe`.
    ///
    /// With [`ConflictPolicy::Check`] the write is refused when the file's
    /// modification time differs from the one in `original` or from the
    /// store's own record, since that means another program changed it.
    pub fn update(
        &mut self,
        original: &RecipeFile,
        recipe: &Recipe,
        policy: ConflictPolicy,
    ) -> Result<RecipeFile, WriteError> {
        let _saving = self.activity.begin_save();
        let path = original.path.clone();

        let cached_modified = match self.cache.get(&path) {
            Some(cached) => cached.modified,
            None => return Err(WriteError::UnknownRecipe { path }),
        };
        let text = recipemd::serialize_with(recipe, &self.options)?;

        let access = self.access_for_write()?;
        if !self.fs.exists(&path) {
            return Err(WriteError::FileNotFound { path });
        }

        if policy == ConflictPolicy::Check {
            let actual = self.fs.modified(&path);
            if actual != original.modified || actual != cached_modified {
                warn!("{} changed on disk since it was read", path.display());
                return Err(WriteError::FileModifiedExternally {
                    path,
                    expected: original.modified,
                    actual,
                });
            }
        }

        self.fs
            .write_atomic(&path, &text)
            .map_err(|source| WriteError::Write {
                path: path.clone(),
                source,
            })?;
        let modified = self.fs.modified(&path);
        drop(access);

        info!("Updated {}", path.display());
        Ok(self.store_written(path, modified, &text, recipe))
    }

    /// Deletes a recipe file. A file that is already gone counts as deleted.
    pub fn delete(&mut self, path: &Path) -> Result<(), DeleteError> {
        let _saving = self.activity.begin_save();

        let access = AccessGuard::acquire(&self.fs, &self.folder).ok_or_else(|| {
            DeleteError::PermissionDenied {
                path: path.to_path_buf(),
            }
        })?;
        if self.fs.exists(path) {
            match self.fs.remove(path) {
                Ok(()) => info!("Deleted {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("{} vanished before delete", path.display())
                }
                Err(e) => return Err(DeleteError::classify(path, e)),
            }
        } else {
            debug!("{} already deleted", path.display());
        }
        drop(access);

        self.forget(path);
        Ok(())
    }

    fn access_for_write(&self) -> Result<AccessGuard<'_, F>, WriteError> {
        let not_accessible = || WriteError::FolderNotAccessible {
            path: self.folder.clone(),
        };
        let access = AccessGuard::acquire(&self.fs, &self.folder).ok_or_else(not_accessible)?;
        if !self.fs.is_dir(&self.folder) {
            return Err(not_accessible());
        }
        Ok(access)
    }

    /// Records a successful write in the cache and the snapshot
    fn store_written(
        &mut self,
        path: PathBuf,
        modified: Option<DateTime<Utc>>,
        text: &str,
        recipe: &Recipe,
    ) -> RecipeFile {
        // Cache what a later scan would see, so reused entries match re-parsed ones
        let recipe = recipemd::parse(text).unwrap_or_else(|_| recipe.clone());
        let file = RecipeFile::new(path.clone(), modified, recipe);

        self.cache.insert(path.clone(), file.clone());
        self.errors.remove(&path);

        let mut files: Vec<RecipeFile> = self
            .recipes
            .iter()
            .filter(|f| f.path != path)
            .cloned()
            .collect();
        files.push(file.clone());
        self.publish(files);

        file
    }

    fn forget(&mut self, path: &Path) {
        self.cache.remove(path);
        self.errors.remove(path);
        let files: Vec<RecipeFile> = self
            .recipes
            .iter()
            .filter(|f| f.path != path)
            .cloned()
            .collect();
        self.publish(files);
    }

    fn publish(&mut self, mut files: Vec<RecipeFile>) {
        files.sort_by(|a, b| {
            a.recipe
                .title
                .to_lowercase()
                .cmp(&b.recipe.title.to_lowercase())
                .then_with(|| a.path.cmp(&b.path))
        });
        self.recipes = Arc::from(files);
    }
}
