//! In-memory mock filesystem for testing collectors without real `/proc` and `/sys`.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Upper bound on chained symlinks, as in the kernel's `MAXSYMLINKS`.
const MAX_SYMLINK_HOPS: usize = 40;

/// In-memory filesystem for testing.
///
/// Stores files, directories and symlinks in memory, so tests can describe a
/// host's block devices and mounts without touching the real system.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Map from link path to its (possibly relative) target.
    symlinks: HashMap<PathBuf, PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a symlink at `link` pointing to `target`.
    ///
    /// Relative targets are resolved against the link's parent directory.
    pub fn add_symlink(&mut self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = link.as_ref().to_path_buf();
        self.add_parents(&link);
        self.symlinks.insert(link, target.as_ref().to_path_buf());
    }

    /// Adds a device node under `/dev`.
    pub fn add_device_node(&mut self, name: &str) {
        self.add_file(format!("/dev/{}", name), "");
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let mut current = normalize(path);
        for _ in 0..MAX_SYMLINK_HOPS {
            match self.symlinks.get(&current) {
                Some(target) => {
                    let base = current.parent().unwrap_or(Path::new("/"));
                    current = normalize(&base.join(target));
                }
                None => return Ok(current),
            }
        }
        Err(io::Error::other(format!(
            "too many levels of symbolic links: {:?}",
            path
        )))
    }
}

/// Lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let resolved = self.resolve(path)?;
        self.files.get(&resolved).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_ok_and(|resolved| {
            self.files.contains_key(&resolved) || self.directories.contains(&resolved)
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let resolved = self.resolve(path)?;
        if !self.directories.contains(&resolved) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();
        let children = self
            .files
            .keys()
            .chain(self.directories.iter())
            .chain(self.symlinks.keys());
        for child in children {
            if child != &resolved && child.parent() == Some(resolved.as_path()) {
                if let Some(name) = child.file_name() {
                    entries.insert(path.join(name));
                }
            }
        }

        Ok(entries.into_iter().collect())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let resolved = self.resolve(path)?;
        if self.files.contains_key(&resolved) || self.directories.contains(&resolved) {
            Ok(resolved)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file or directory: {:?}", path),
            ))
        }
    }
}
