//! File-system access used by the dataset walker.
//!
//! [`LocalStore`] works on the real file system. [`MemoryStore`] keeps files in
//! memory so the conversion pipeline can run against fixtures.

use glob::glob;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub trait DatasetStore: Sync {
    /// Create `path` and its parents; existing directories are left untouched
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Files directly inside `dir` whose name has an extension, sorted.
    /// A missing directory yields an empty list.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn is_file(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate `path` and write `contents`
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl DatasetStore for LocalStore {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let pattern = format!("{}/*.*", glob::Pattern::escape(&dir.to_string_lossy()));
        let entries = glob(&pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        // fs::copy carries the permission bits over
        fs::copy(from, to).map(|_| ())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[derive(Debug, Default)]
struct MemoryTree {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
}

/// In-memory file tree.
///
/// Writing or copying into a directory that was never created fails with
/// `NotFound`, like the real file system does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: Mutex<MemoryTree>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut tree = self.lock();
        if let Some(parent) = path.parent() {
            insert_dir_all(&mut tree.dirs, parent);
        }
        tree.files.insert(path.to_path_buf(), contents.into());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        self.lock().dirs.contains(path.as_ref())
    }

    /// Every file path currently stored, sorted
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTree> {
        // A poisoned tree is still structurally valid
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn insert_dir_all(dirs: &mut BTreeSet<PathBuf>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        dirs.insert(ancestor.to_path_buf());
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

fn check_parent(tree: &MemoryTree, path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !tree.dirs.contains(parent) => {
            Err(not_found(parent))
        }
        _ => Ok(()),
    }
}

impl DatasetStore for MemoryStore {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        insert_dir_all(&mut self.lock().dirs, path);
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .lock()
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir) && path.extension().is_some())
            .cloned()
            .collect())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.lock().files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.contents(path).ok_or_else(|| not_found(path))?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut tree = self.lock();
        check_parent(&tree, path)?;
        tree.files.insert(path.to_path_buf(), contents.as_bytes().to_vec());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut tree = self.lock();
        let bytes = tree.files.get(from).cloned().ok_or_else(|| not_found(from))?;
        check_parent(&tree, to)?;
        tree.files.insert(to.to_path_buf(), bytes);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.lock()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }
}
