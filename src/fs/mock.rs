// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, bail, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem for tests.
///
/// Paths are normalized by dropping `.` components, so `./a.yaml` and
/// `a.yaml` name the same entry; the root directory is `.`.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
    symlinks: Arc<Mutex<BTreeSet<PathBuf>>>,
    read_only: Arc<Mutex<bool>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

fn parent_of(path: &Path) -> Option<PathBuf> {
    if path == Path::new(".") {
        return None;
    }
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => Some(p.to_path_buf()),
        Some(_) => Some(PathBuf::from(".")),
        None => None,
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir);
        Self {
            entries: Arc::new(Mutex::new(entries)),
            symlinks: Arc::new(Mutex::new(BTreeSet::new())),
            read_only: Arc::new(Mutex::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every subsequent `write`/`rename` fail, to simulate an
    /// unwritable destination.
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.lock().unwrap_or_else(|e| e.into_inner()) = read_only;
    }

    fn is_read_only(&self) -> bool {
        *self.read_only.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = normalize(path.as_ref());
        let mut entries = self.lock();
        let mut dir = parent_of(&path);
        while let Some(d) = dir {
            entries.entry(d.clone()).or_insert(MockEntry::Dir);
            dir = parent_of(&d);
        }
        entries.insert(path, MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        let mut entries = self.lock();
        let mut dir = Some(path);
        while let Some(d) = dir {
            entries.entry(d.clone()).or_insert(MockEntry::Dir);
            dir = parent_of(&d);
        }
    }

    /// Mark an existing entry as a symbolic link. The entry keeps resolving
    /// as before; only `is_symlink` changes.
    pub fn mark_symlink(&self, path: impl AsRef<Path>) {
        self.symlinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(normalize(path.as_ref()));
    }

    /// Remove a file or a directory together with everything beneath it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        self.lock().retain(|p, _| !p.starts_with(&path));
    }

    /// Raw contents of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().get(&normalize(path.as_ref())) {
            Some(MockEntry::File(c)) => Some(c.clone()),
            _ => None,
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.lock().get(&normalize(path)) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {}", path.display())),
            None => Err(anyhow!("File not found: {}", path.display())),
        }
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let content = self.read(path)?;
        String::from_utf8(content).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if self.is_read_only() {
            bail!("Read-only filesystem: {:?}", path);
        }
        if self.is_dir(path) {
            bail!("Is a directory: {:?}", path);
        }
        self.add_file(path, contents);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if self.is_read_only() {
            bail!("Read-only filesystem: {:?}", to);
        }
        let from = normalize(from);
        let to = normalize(to);
        let mut entries = self.lock();
        if matches!(entries.get(&to), Some(MockEntry::Dir)) {
            bail!("Is a directory: {:?}", to);
        }
        match entries.remove(&from) {
            Some(entry @ MockEntry::File(_)) => {
                entries.insert(to, entry);
                Ok(())
            }
            Some(entry) => {
                entries.insert(from.clone(), entry);
                Err(anyhow!("Is a directory: {:?}", from))
            }
            None => Err(anyhow!("File not found: {:?}", from)),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let path = normalize(path);
        let mut entries = self.lock();
        match entries.get(&path) {
            Some(MockEntry::File(_)) => {
                entries.remove(&path);
                Ok(())
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(&normalize(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(&normalize(path)), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(&normalize(path)), Some(MockEntry::Dir))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.symlinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&normalize(path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let dir = normalize(path);
        let entries = self.lock();
        if !matches!(entries.get(&dir), Some(MockEntry::Dir)) {
            return Err(anyhow!("Not a directory or not found: {}", path.display()));
        }
        // Children are joined onto the path exactly as the caller spelled
        // it, mirroring `std::fs::read_dir`.
        Ok(entries
            .keys()
            .filter(|p| *p != &dir && parent_of(p).as_deref() == Some(dir.as_path()))
            .filter_map(|p| p.file_name().map(|name| path.join(name)))
            .collect())
    }
}
