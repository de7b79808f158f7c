//! Plain-file access to sysfs, behind a small trait so scans can run against
//! an in-memory tree.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait SysfsReader {
    /// File content with surrounding whitespace removed.
    fn read_trimmed(&self, path: &Path) -> io::Result<String>;

    /// Entry names of a directory, sorted.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    fn exists(&self, path: &Path) -> bool;

    /// First entry of `dir` whose name starts with `prefix`. `Ok(None)` when the
    /// directory is readable but nothing matches.
    fn find_first_by_prefix(&self, dir: &Path, prefix: &str) -> io::Result<Option<String>> {
        Ok(self
            .list_dir(dir)?
            .into_iter()
            .find(|name| name.starts_with(prefix)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSysfs;

impl SysfsReader for DiskSysfs {
    fn read_trimmed(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).map(|value| value.trim().to_string())
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Fixture tree held in memory. Parent directories are created implicitly.
#[derive(Debug, Clone, Default)]
pub struct MemorySysfs {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
}

impl MemorySysfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> &mut Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.insert(path.to_path_buf(), content.into());
        self
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
        self
    }
}

impl SysfsReader for MemorySysfs {
    fn read_trimmed(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| not_found(path))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        if !self.dirs.contains(path) {
            return Err(not_found(path));
        }
        let children: BTreeSet<String> = self
            .dirs
            .iter()
            .chain(self.files.keys())
            .filter(|child| child.parent() == Some(path))
            .filter_map(|child| child.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect();
        Ok(children.into_iter().collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.contains(path)
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}
