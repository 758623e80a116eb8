use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Returns `path` joined onto `base` (unless it is already absolute) without `.` or `..`
/// components.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.clean()
    } else {
        base.join(path).clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_path() {
        let resolved = resolve_path(Path::new("/home/user"), Path::new("./games/../repo"));
        assert_eq!(PathBuf::from("/home/user/repo"), resolved);
    }

    #[test]
    fn test_resolve_absolute_path() {
        let resolved = resolve_path(Path::new("/home/user"), Path::new("/tmp/./clone"));
        assert_eq!(PathBuf::from("/tmp/clone"), resolved);
    }
}
