//! Lexical path normalization.
//!
//! Live paths come from the torrent daemon and scanned paths from the local
//! walk; both sides go through [`normalize`] so that set membership is a plain
//! equality test. No I/O happens here and symlinks are not resolved.

use std::path::{Component, Path, PathBuf};

/// Canonicalize `path` for comparison.
///
/// Drops `.` segments, folds `..` into the preceding segment (never climbing
/// above the root of an absolute path), and collapses repeated or trailing
/// separators. On Windows the result is also lowercased. Never fails; relative
/// paths keep any leading `..` they cannot fold.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    let normalized: PathBuf = parts.iter().collect();
    fold_case(normalized)
}

/// Join a torrent-relative file name onto its download directory and normalize.
pub fn resolve(download_dir: impl AsRef<Path>, name: impl AsRef<Path>) -> PathBuf {
    normalize(download_dir.as_ref().join(name))
}

#[cfg(windows)]
fn fold_case(path: PathBuf) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

#[cfg(not(windows))]
fn fold_case(path: PathBuf) -> PathBuf {
    path
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_current_dir_segments_are_dropped() {
        assert_eq!(
            normalize("/data/dl/movie/./a.mkv"),
            normalize("/data/dl/movie/a.mkv")
        );
    }

    #[test]
    fn test_parent_dir_segments_are_folded() {
        assert_eq!(
            normalize("/data/dl/movie/../movie/a.mkv"),
            normalize("/data/dl/movie/a.mkv")
        );
        assert_eq!(normalize("/data/dl/a/b/../../c"), PathBuf::from("/data/dl/c"));
    }

    #[test]
    fn test_separators_collapse() {
        assert_eq!(normalize("/data//dl///a.mkv"), PathBuf::from("/data/dl/a.mkv"));
        assert_eq!(normalize("/data/dl/"), PathBuf::from("/data/dl"));
    }

    #[test]
    fn test_parent_dir_never_climbs_above_root() {
        assert_eq!(normalize("/../../etc/passwd"), PathBuf::from("/etc/passwd"));
        assert_eq!(normalize("/.."), PathBuf::from("/"));
    }

    #[test]
    fn test_relative_paths_keep_unresolvable_parents() {
        assert_eq!(normalize("../x/./y"), PathBuf::from("../x/y"));
        assert_eq!(normalize("a/../../b"), PathBuf::from("../b"));
        assert_eq!(normalize("./"), PathBuf::from(""));
    }

    #[test]
    fn test_case_is_preserved() {
        assert_ne!(normalize("/data/A.mkv"), normalize("/data/a.mkv"));
    }

    #[test]
    fn test_resolve_joins_and_normalizes() {
        assert_eq!(
            resolve("/data/downloads/", "Show/./S01/../S01/e01.mkv"),
            PathBuf::from("/data/downloads/Show/S01/e01.mkv")
        );
    }

    #[test]
    fn test_resolve_with_absolute_name_replaces_dir() {
        // Path::join semantics: an absolute file name wins.
        assert_eq!(resolve("/data", "/other/f"), PathBuf::from("/other/f"));
    }
}
