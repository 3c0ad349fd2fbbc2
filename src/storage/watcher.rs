//! Folder watching
//!
//! Debounced file system events for a recipe folder are turned into a
//! [`RescanSignal`] request. Bursts of events inside the debounce window
//! collapse into one notification.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use log::{debug, warn};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use thiserror::Error;

use super::activity::RescanSignal;
use super::filename;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Watches one folder until dropped
pub struct FolderWatcher {
    folder: PathBuf,
    wake: Receiver<()>,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl FolderWatcher {
    /// Starts watching `folder`, raising `signal` after each debounced burst
    /// of changes to recipe files
    pub fn start(folder: &Path, debounce: Duration, signal: RescanSignal) -> Result<Self, WatchError> {
        let (wake_tx, wake) = mpsc::channel();
        let watch_error = |source: notify::Error| WatchError::Watch {
            path: folder.to_path_buf(),
            source,
        };

        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    if has_recipe_change(events.iter().map(|e| e.path.as_path())) {
                        debug!("Detected {} change(s)", events.len());
                        signal.request();
                        let _ = wake_tx.send(());
                    }
                }
                Err(error) => warn!("Watch error: {:?}", error),
            }
        })
        .map_err(watch_error)?;

        debouncer
            .watcher()
            .watch(folder, RecursiveMode::NonRecursive)
            .map_err(watch_error)?;

        Ok(Self {
            folder: folder.to_path_buf(),
            wake,
            _debouncer: debouncer,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Blocks until the next change; false once the watcher has stopped
    pub fn wait(&self) -> bool {
        let woke = self.wake.recv().is_ok();
        self.drain();
        woke
    }

    /// Like [`wait`](Self::wait) with an upper bound; false on timeout
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.wake.recv_timeout(timeout) {
            Ok(()) => {
                self.drain();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Extra wake-ups are already covered by the pending signal
    fn drain(&self) {
        while self.wake.try_recv().is_ok() {}
    }
}

/// True if any path is a recipe file
fn has_recipe_change<'a>(paths: impl IntoIterator<Item = &'a Path>) -> bool {
    paths.into_iter().any(filename::is_recipe_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_recipe_files_count_as_changes() {
        let temp = [Path::new("/r/soup.md.tmp"), Path::new("/r/.DS_Store")];
        assert!(!has_recipe_change(temp));

        let real = [Path::new("/r/soup.md.tmp"), Path::new("/r/soup.md")];
        assert!(has_recipe_change(real));
    }

    #[test]
    fn watching_missing_folder_fails() {
        let result = FolderWatcher::start(
            Path::new("/definitely/not/here"),
            Duration::from_millis(50),
            RescanSignal::new(),
        );
        assert!(result.is_err());
    }
}
