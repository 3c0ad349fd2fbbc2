//! File system access
//!
//! The store never touches `std::fs` directly; it goes through
//! [`FileSystem`] so hosts can supply sandboxed or scoped access, and tests
//! can run against [`MemoryFs`] with a deterministic clock.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use fs2::FileExt;

/// File operations the store depends on
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Reads a UTF-8 file; invalid UTF-8 is reported as `InvalidData`
    fn read_text(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Replaces the file's contents so readers never see a partial write
    fn write_atomic(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Last modification time, `None` if unavailable
    fn modified(&self, path: &Path) -> Option<DateTime<Utc>>;

    /// Entries directly inside `folder`
    fn list(&self, folder: &Path) -> io::Result<Vec<PathBuf>>;

    /// Called before a batch of operations on `folder`. Returning false
    /// means access was refused.
    fn begin_access(&self, _folder: &Path) -> bool {
        true
    }

    /// Releases access taken by [`begin_access`](FileSystem::begin_access)
    fn end_access(&self, _folder: &Path) {}
}

/// Holds scoped access to a folder for as long as it lives
pub struct AccessGuard<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    folder: &'a Path,
}

impl<'a, F: FileSystem + ?Sized> AccessGuard<'a, F> {
    /// Requests access, returning `None` if the file system refused it
    pub fn acquire(fs: &'a F, folder: &'a Path) -> Option<Self> {
        fs.begin_access(folder).then(|| Self { fs, folder })
    }
}

impl<F: FileSystem + ?Sized> Drop for AccessGuard<'_, F> {
    fn drop(&mut self) {
        self.fs.end_access(self.folder);
    }
}

/// The local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> io::Result<()> {
        let temp_path = Self::temp_path(path);

        // Write to temp file first, then rename over the target
        if let Err(e) = fs::write(&temp_path, contents) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        // A file another process holds an exclusive lock on is reported as busy
        let file = File::open(path)?;
        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    format!("{} is locked by another process", path.display()),
                ));
            }
            return Err(e);
        }
        let _ = FileExt::unlock(&file);
        drop(file);

        fs::remove_file(path)
    }

    fn modified(&self, path: &Path) -> Option<DateTime<Utc>> {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }

    fn list(&self, folder: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(folder)? {
            entries.push(entry?.path());
        }
        entries.sort();
        Ok(entries)
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    bytes: Vec<u8>,
    modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, MemoryFile>,
    locked: BTreeSet<PathBuf>,
    protected: BTreeSet<PathBuf>,
    denied_folders: BTreeSet<PathBuf>,
    tick: i64,
    open_scopes: usize,
}

impl MemoryState {
    /// Advances the clock; every write gets a distinct modification time
    fn next_time(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        DateTime::from_timestamp(MemoryFs::EPOCH + self.tick, 0).unwrap_or_default()
    }
}

/// An in-memory file system with a logical clock
#[derive(Debug, Default)]
pub struct MemoryFs {
    state: Mutex<MemoryState>,
}

impl MemoryFs {
    /// Base of the logical clock (2024-01-01T00:00:00Z)
    const EPOCH: i64 = 1_704_067_200;

    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Creates a folder
    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.state().dirs.insert(path.into());
    }

    /// Writes a file, bypassing atomicity, and stamps a new modification time
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) {
        let mut state = self.state();
        let modified = state.next_time();
        state.files.insert(
            path.into(),
            MemoryFile {
                bytes: contents.as_ref().to_vec(),
                modified,
            },
        );
    }

    /// Bumps a file's modification time without changing its contents
    pub fn touch(&self, path: &Path) {
        let mut state = self.state();
        let modified = state.next_time();
        if let Some(file) = state.files.get_mut(path) {
            file.modified = modified;
        }
    }

    /// Removes a file behind the store's back
    pub fn delete(&self, path: &Path) {
        self.state().files.remove(path);
    }

    /// Current contents of a file as text
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.state()
            .files
            .get(path)
            .map(|f| String::from_utf8_lossy(&f.bytes).into_owned())
    }

    /// Makes deletes of `path` fail as if another process held it open
    pub fn lock(&self, path: impl Into<PathBuf>) {
        self.state().locked.insert(path.into());
    }

    /// Makes writes and deletes of `path` fail with permission denied
    pub fn protect(&self, path: impl Into<PathBuf>) {
        self.state().protected.insert(path.into());
    }

    /// Refuses scoped access to `folder`
    pub fn deny_access(&self, folder: impl Into<PathBuf>) {
        self.state().denied_folders.insert(folder.into());
    }

    /// Number of scoped-access grants not yet released
    pub fn open_scopes(&self) -> usize {
        self.state().open_scopes
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("{} is read-only", path.display()),
    )
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state().dirs.contains(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.state()
            .files
            .get(path)
            .map(|f| f.bytes.clone())
            .ok_or_else(|| not_found(path))
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut state = self.state();
        if state.protected.contains(path) {
            return Err(permission_denied(path));
        }
        let parent = path.parent().unwrap_or(Path::new(""));
        if !state.dirs.contains(parent) {
            return Err(not_found(parent));
        }
        let modified = state.next_time();
        state.files.insert(
            path.to_path_buf(),
            MemoryFile {
                bytes: contents.as_bytes().to_vec(),
                modified,
            },
        );
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state();
        if !state.files.contains_key(path) {
            return Err(not_found(path));
        }
        if state.locked.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                format!("{} is locked by another process", path.display()),
            ));
        }
        if state.protected.contains(path) {
            return Err(permission_denied(path));
        }
        state.files.remove(path);
        Ok(())
    }

    fn modified(&self, path: &Path) -> Option<DateTime<Utc>> {
        self.state().files.get(path).map(|f| f.modified)
    }

    fn list(&self, folder: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.state();
        if !state.dirs.contains(folder) {
            return Err(not_found(folder));
        }
        Ok(state
            .files
            .keys()
            .filter(|p| p.parent() == Some(folder))
            .cloned()
            .collect())
    }

    fn begin_access(&self, folder: &Path) -> bool {
        let mut state = self.state();
        if state.denied_folders.contains(folder) {
            return false;
        }
        state.open_scopes += 1;
        true
    }

    fn end_access(&self, _folder: &Path) {
        let mut state = self.state();
        state.open_scopes = state.open_scopes.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn local_atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("soup.md");

        LocalFs.write_atomic(&path, "# Soup\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# Soup\n");
        assert!(!dir.path().join("soup.md.tmp").exists());
        assert!(LocalFs.modified(&path).is_some());
    }

    #[test]
    fn local_read_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.md");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = LocalFs.read_text(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn local_remove_and_list() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        assert_eq!(LocalFs.list(dir.path()).unwrap(), vec![a.clone(), b.clone()]);

        LocalFs.remove(&a).unwrap();
        assert!(!LocalFs.exists(&a));
        assert_eq!(LocalFs.remove(&a).unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_clock_advances_on_every_write() {
        let fs = MemoryFs::new();
        fs.add_dir("/r");
        let path = Path::new("/r/a.md");

        fs.write_atomic(path, "one").unwrap();
        let first = fs.modified(path).unwrap();
        fs.write_atomic(path, "two").unwrap();
        let second = fs.modified(path).unwrap();

        assert!(second > first);
        assert_eq!(fs.contents(path).as_deref(), Some("two"));
    }

    #[test]
    fn memory_write_needs_parent_folder() {
        let fs = MemoryFs::new();
        let err = fs.write_atomic(Path::new("/missing/a.md"), "x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn access_guard_releases_on_drop() {
        let fs = MemoryFs::new();
        let folder = Path::new("/r");
        {
            let _guard = AccessGuard::acquire(&fs, folder).unwrap();
            assert_eq!(fs.open_scopes(), 1);
        }
        assert_eq!(fs.open_scopes(), 0);

        fs.deny_access("/r");
        assert!(AccessGuard::acquire(&fs, folder).is_none());
        assert_eq!(fs.open_scopes(), 0);
    }
}
