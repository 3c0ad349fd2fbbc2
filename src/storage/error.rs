//! Errors surfaced by [`RecipeStore`](super::RecipeStore) operations

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::filename::FilenameError;
use crate::recipemd::SerializeError;

/// Scanning the folder failed as a whole
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Recipe folder is not accessible: {}", path.display())]
    FolderNotAccessible { path: PathBuf },

    #[error("Failed to list recipe folder {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creating or updating a recipe failed
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Recipe folder is not accessible: {}", path.display())]
    FolderNotAccessible { path: PathBuf },

    #[error("Cannot derive a file name: {source}")]
    InvalidFilename {
        #[from]
        source: FilenameError,
    },

    #[error("Cannot write recipe: {source}")]
    Serialization {
        #[from]
        source: SerializeError,
    },

    #[error("Recipe file no longer exists: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Recipe is not managed by this store: {}", path.display())]
    UnknownRecipe { path: PathBuf },

    #[error("{} was changed by another program; reload it or overwrite explicitly", path.display())]
    FileModifiedExternally {
        path: PathBuf,
        expected: Option<DateTime<Utc>>,
        actual: Option<DateTime<Utc>>,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    /// True for conflicts that can be retried with an explicit overwrite
    pub fn is_conflict(&self) -> bool {
        matches!(self, WriteError::FileModifiedExternally { .. })
    }
}

/// Deleting a recipe failed
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("Permission denied deleting {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("{} is in use by another program", path.display())]
    FileLocked { path: PathBuf },

    #[error("Failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(unix)]
const LOCKED_OS_ERRORS: &[i32] = &[
    16, // EBUSY
    26, // ETXTBSY
];

#[cfg(windows)]
const LOCKED_OS_ERRORS: &[i32] = &[
    32, // ERROR_SHARING_VIOLATION
    33, // ERROR_LOCK_VIOLATION
];

#[cfg(not(any(unix, windows)))]
const LOCKED_OS_ERRORS: &[i32] = &[];

impl DeleteError {
    /// Sorts an I/O failure into permission, lock or generic errors
    pub fn classify(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        let locked = err.kind() == io::ErrorKind::WouldBlock
            || err
                .raw_os_error()
                .is_some_and(|code| LOCKED_OS_ERRORS.contains(&code));

        if locked {
            DeleteError::FileLocked { path }
        } else if err.kind() == io::ErrorKind::PermissionDenied {
            DeleteError::PermissionDenied { path }
        } else {
            DeleteError::Delete { path, source: err }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_delete_failures() {
        let path = Path::new("soup.md");

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            DeleteError::classify(path, denied),
            DeleteError::PermissionDenied { .. }
        ));

        let busy = io::Error::new(io::ErrorKind::WouldBlock, "locked");
        assert!(matches!(
            DeleteError::classify(path, busy),
            DeleteError::FileLocked { .. }
        ));

        let other = io::Error::new(io::ErrorKind::Other, "disk on fire");
        assert!(matches!(
            DeleteError::classify(path, other),
            DeleteError::Delete { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn classify_busy_os_error() {
        let busy = io::Error::from_raw_os_error(16);
        assert!(matches!(
            DeleteError::classify(Path::new("soup.md"), busy),
            DeleteError::FileLocked { .. }
        ));
    }

    #[test]
    fn conflicts_are_retryable() {
        let conflict = WriteError::FileModifiedExternally {
            path: PathBuf::from("soup.md"),
            expected: None,
            actual: None,
        };
        assert!(conflict.is_conflict());
        assert!(!WriteError::FileNotFound {
            path: PathBuf::from("soup.md")
        }
        .is_conflict());
    }
}
