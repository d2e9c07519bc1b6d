//! Path utility functions for normalization and comparison.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep the `..` when there is nothing left to pop
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Check if `path` is under `dir` by comparing normalized path components.
///
/// `/solution/packages/../../etc` is NOT under `/solution/packages`.
pub fn is_path_under(path: &Path, dir: &Path) -> bool {
    let normalized_path = normalize_path(path);
    let normalized_dir = normalize_path(dir);

    let path_components: Vec<_> = normalized_path.components().collect();
    let dir_components: Vec<_> = normalized_dir.components().collect();

    if path_components.len() < dir_components.len() {
        return false;
    }

    dir_components
        .iter()
        .zip(path_components.iter())
        .all(|(d, p)| d == p)
}

/// Calculate the relative path from a directory to a target path.
///
/// Returns `None` if a relative path cannot be computed (e.g., different drive letters on Windows).
pub fn relative_path_from_dir(from_dir: &Path, to_path: &Path) -> Option<PathBuf> {
    let result = pathdiff::diff_paths(to_path, from_dir)?;

    if result.is_absolute() {
        return None;
    }

    Some(result)
}

/// Resolve a stored relative path against a base directory.
pub fn resolve_relative_path(base_dir: &Path, relative_path: &Path) -> PathBuf {
    if relative_path.is_absolute() {
        relative_path.to_path_buf()
    } else {
        normalize_path(&base_dir.join(relative_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_with_parent_dir() {
        assert_eq!(
            normalize_path(Path::new("/solution/packages/../MyProject/./packages.json")),
            PathBuf::from("/solution/MyProject/packages.json")
        );
    }

    #[test]
    fn test_normalize_path_relative_keeps_leading_parent() {
        assert_eq!(
            normalize_path(Path::new("../MyProject/packages.json")),
            PathBuf::from("../MyProject/packages.json")
        );
    }

    #[test]
    fn test_is_path_under_simple() {
        assert!(is_path_under(
            Path::new("/solution/packages/Test.1.0"),
            Path::new("/solution/packages")
        ));
        assert!(is_path_under(
            Path::new("/solution/packages"),
            Path::new("/solution/packages")
        ));
    }

    #[test]
    fn test_is_path_under_partial_component_match() {
        // "/solution/packages-old" must not match "/solution/packages"
        assert!(!is_path_under(
            Path::new("/solution/packages-old/Test.1.0"),
            Path::new("/solution/packages")
        ));
    }

    #[test]
    fn test_is_path_under_directory_traversal() {
        assert!(!is_path_under(
            Path::new("/solution/packages/../../etc"),
            Path::new("/solution/packages")
        ));
    }

    #[test]
    fn test_relative_path_from_dir_sibling() {
        let result = relative_path_from_dir(
            Path::new("/solution/packages"),
            Path::new("/solution/MyProject/packages.json"),
        );
        assert_eq!(result, Some(PathBuf::from("../MyProject/packages.json")));
    }

    #[test]
    fn test_resolve_relative_path_round_trip() {
        let base = Path::new("/solution/packages");
        let target = Path::new("/solution/MyProject/packages.json");
        let relative = relative_path_from_dir(base, target).unwrap();

        assert_eq!(resolve_relative_path(base, &relative), target);
    }

    #[test]
    fn test_resolve_relative_path_absolute_passthrough() {
        assert_eq!(
            resolve_relative_path(Path::new("/base"), Path::new("/elsewhere/file")),
            PathBuf::from("/elsewhere/file")
        );
    }
}
