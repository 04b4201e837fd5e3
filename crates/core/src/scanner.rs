//! Recursive enumeration of candidate files under the sweep root.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

use crate::paths;

/// The sweep root cannot be scanned.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Download directory does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Download directory is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Cannot access download directory: {path}")]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A regular file seen during the walk, sized at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedFile {
    /// Normalized absolute path.
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Walks the sweep root looking for regular files.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
}

impl DirectoryScanner {
    /// Validate `root` and prepare a scanner for it.
    ///
    /// Relative roots are made absolute against the working directory. The
    /// root itself may be a symlink to a directory; nothing below it is
    /// followed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ScanError> {
        let given = root.as_ref();
        let absolute = std::path::absolute(given).map_err(|source| {
            ScanError::RootInaccessible {
                path: given.to_path_buf(),
                source,
            }
        })?;
        let root = paths::normalize(absolute);

        let metadata = match std::fs::metadata(&root) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScanError::RootNotFound { path: root });
            }
            Err(source) => {
                return Err(ScanError::RootInaccessible { path: root, source });
            }
        };
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }

        Ok(Self { root })
    }

    /// Normalized absolute root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a fresh walk. Each call re-reads the filesystem.
    pub fn scan(&self) -> Scan {
        Scan {
            entries: WalkDir::new(&self.root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
            skipped: 0,
        }
    }
}

/// Lazy, one-shot walk yielding regular files in discovery order.
///
/// Symlinks, directories and special files are never yielded. Entries that
/// vanish or cannot be read mid-walk are logged and counted in
/// [`Scan::skipped`].
pub struct Scan {
    entries: walkdir::IntoIter,
    skipped: usize,
}

impl Scan {
    /// Entries skipped so far because they could not be read.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Scan {
    type Item = ScannedFile;

    fn next(&mut self) -> Option<ScannedFile> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = ?e.path(), error = %e, "Skipping unreadable entry");
                    self.skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    return Some(ScannedFile {
                        path: paths::normalize(entry.path()),
                        size_bytes: metadata.len(),
                    });
                }
                Err(e) => {
                    warn!(path = ?entry.path(), error = %e, "Skipping file that cannot be stat'ed");
                    self.skipped += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::write_file;
    use tempfile::TempDir;

    #[test]
    fn test_scan_finds_nested_files_with_sizes() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "a.mkv", 10).unwrap();
        write_file(temp.path(), "show/s01/e01.mkv", 20).unwrap();
        std::fs::create_dir_all(temp.path().join("empty")).unwrap();

        let scanner = DirectoryScanner::new(temp.path()).unwrap();
        let mut scan = scanner.scan();
        let files: Vec<ScannedFile> = scan.by_ref().collect();

        assert_eq!(files.len(), 2);
        assert_eq!(scan.skipped(), 0);
        assert_eq!(files[0].path, paths::normalize(temp.path().join("a.mkv")));
        assert_eq!(files[0].size_bytes, 10);
        assert_eq!(
            files[1].path,
            paths::normalize(temp.path().join("show/s01/e01.mkv"))
        );
        assert_eq!(files[1].size_bytes, 20);
    }

    #[test]
    fn test_scan_is_repeatable() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "x", 1).unwrap();
        write_file(temp.path(), "y/z", 2).unwrap();

        let scanner = DirectoryScanner::new(temp.path()).unwrap();
        let first: Vec<_> = scanner.scan().collect();
        let second: Vec<_> = scanner.scan().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = DirectoryScanner::new(&missing).unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound { .. }));
    }

    #[test]
    fn test_file_root_is_rejected() {
        let temp = TempDir::new().unwrap();
        let file = write_file(temp.path(), "file.txt", 3).unwrap();
        let err = DirectoryScanner::new(&file).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[test]
    fn test_root_is_normalized() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("dl")).unwrap();
        let scanner = DirectoryScanner::new(temp.path().join("dl/./../dl/")).unwrap();
        assert_eq!(scanner.root(), paths::normalize(temp.path().join("dl")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_candidates() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = write_file(outside.path(), "precious.bin", 5).unwrap();
        write_file(temp.path(), "real.bin", 1).unwrap();
        std::os::unix::fs::symlink(&target, temp.path().join("link.bin")).unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("linkdir")).unwrap();

        let scanner = DirectoryScanner::new(temp.path()).unwrap();
        let files: Vec<_> = scanner.scan().collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("real.bin"));
    }
}
