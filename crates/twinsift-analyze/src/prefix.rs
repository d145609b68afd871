//! Longest shared directory prefix of a set of paths.

use std::path::{Component, Path, PathBuf};

/// Compute the longest path prefix shared by all `paths`, component-wise.
///
/// The root of an absolute path is a component of its own, so `/a/x` and
/// `/b/y` share `/`. Paths whose first components differ share the empty
/// path. An empty slice also yields the empty path.
pub fn common_ancestor<P: AsRef<Path>>(paths: &[P]) -> PathBuf {
    let Some((first, rest)) = paths.split_first() else {
        return PathBuf::new();
    };

    let mut shared: Vec<Component<'_>> = first.as_ref().components().collect();
    for path in rest {
        let matching = shared
            .iter()
            .zip(path.as_ref().components())
            .take_while(|(a, b)| **a == *b)
            .count();
        shared.truncate(matching);
        if shared.is_empty() {
            break;
        }
    }

    shared.iter().collect()
}

/// Rebuild a member path from its decomposition.
///
/// An empty `folder` or `ancestor` contributes nothing, so no doubled
/// separator is produced.
pub fn rejoin(ancestor: &Path, folder: &Path, filename: impl AsRef<Path>) -> PathBuf {
    let mut path = ancestor.to_path_buf();
    if !folder.as_os_str().is_empty() {
        path.push(folder);
    }
    path.push(filename);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_parent() {
        let ancestor = common_ancestor(&["/a/b", "/a/b"]);
        assert_eq!(ancestor, PathBuf::from("/a/b"));
    }

    #[test]
    fn test_sibling_folders() {
        let ancestor = common_ancestor(&["/a/b1", "/a/b2", "/a/b1/deep"]);
        assert_eq!(ancestor, PathBuf::from("/a"));
    }

    #[test]
    fn test_prefix_is_component_wise() {
        // "/a/bc" must not be treated as sharing "/a/b".
        let ancestor = common_ancestor(&["/a/b", "/a/bc"]);
        assert_eq!(ancestor, PathBuf::from("/a"));
    }

    #[test]
    fn test_disjoint_absolute_paths_share_root() {
        let ancestor = common_ancestor(&["/x/one", "/y/two"]);
        assert_eq!(ancestor, PathBuf::from("/"));
    }

    #[test]
    fn test_disjoint_relative_paths_share_nothing() {
        let ancestor = common_ancestor(&["x/one", "y/two"]);
        assert_eq!(ancestor, PathBuf::new());
    }

    #[test]
    fn test_single_path_is_its_own_ancestor() {
        assert_eq!(common_ancestor(&["/a/b/c"]), PathBuf::from("/a/b/c"));
    }

    #[test]
    fn test_empty_input() {
        let none: [&str; 0] = [];
        assert_eq!(common_ancestor(&none), PathBuf::new());
    }

    #[test]
    fn test_rejoin() {
        assert_eq!(
            rejoin(Path::new("/a"), Path::new("b/c"), "f.txt"),
            PathBuf::from("/a/b/c/f.txt")
        );
        assert_eq!(
            rejoin(Path::new("/a"), Path::new(""), "f.txt"),
            PathBuf::from("/a/f.txt")
        );
        assert_eq!(
            rejoin(Path::new(""), Path::new("x"), "f.txt"),
            PathBuf::from("x/f.txt")
        );
    }
}
