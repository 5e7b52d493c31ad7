//! Root containment guard.
//!
//! Every path the resolver hands out passes through [`ContainmentGuard::check`],
//! including the literal fallback. Only an alias rule with `allow_outside`
//! can yield a path outside the root.

use std::path::{Path, PathBuf};

use crate::routing::path::normalize;

/// Keeps resolved paths inside the configured root.
#[derive(Debug, Clone)]
pub struct ContainmentGuard {
    root: PathBuf,
}

impl ContainmentGuard {
    /// Guard `root`, collapsed lexically so it compares like resolved paths.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize(&root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` lies inside the root, compared component by component.
    /// Case is folded on Windows only.
    pub fn contains(&self, path: &Path) -> bool {
        if cfg!(windows) {
            let fold = |p: &Path| PathBuf::from(p.to_string_lossy().to_lowercase());
            fold(path).starts_with(fold(&self.root))
        } else {
            path.starts_with(&self.root)
        }
    }

    /// Pass `path` through unchanged when allowed, otherwise hand it back as
    /// the error value.
    pub fn check(&self, path: PathBuf, allow_outside: bool) -> Result<PathBuf, PathBuf> {
        if allow_outside || self.contains(&path) {
            Ok(path)
        } else {
            Err(path)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_inside_root() {
        let guard = ContainmentGuard::new("/site");
        assert!(guard.contains(Path::new("/site")));
        assert!(guard.contains(Path::new("/site/a/b.html")));
        assert_eq!(
            guard.check(PathBuf::from("/site/a.html"), false),
            Ok(PathBuf::from("/site/a.html"))
        );
    }

    #[test]
    fn test_outside_root() {
        let guard = ContainmentGuard::new("/site");
        assert!(!guard.contains(Path::new("/etc/passwd")));
        assert!(!guard.contains(Path::new("/site-private/key")));
        assert_eq!(
            guard.check(PathBuf::from("/etc/passwd"), false),
            Err(PathBuf::from("/etc/passwd"))
        );
    }

    #[test]
    fn test_root_is_normalized() {
        let guard = ContainmentGuard::new("/srv/www/../site/.");
        assert_eq!(guard.root(), Path::new("/srv/site"));
        assert!(guard.contains(Path::new("/srv/site/a.html")));
    }

    #[test]
    fn test_allow_outside() {
        let guard = ContainmentGuard::new("/site");
        assert_eq!(
            guard.check(PathBuf::from("/shared/a.css"), true),
            Ok(PathBuf::from("/shared/a.css"))
        );
    }

    #[test]
    fn test_case_sensitive_on_unix() {
        let guard = ContainmentGuard::new("/site");
        assert!(!guard.contains(Path::new("/SITE/a.html")));
    }
}
