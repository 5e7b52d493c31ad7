//! Lexical path helpers.
//!
//! Nothing here touches the filesystem: `..` is collapsed textually, so a
//! normalized path can point outside the root. Callers rely on the
//! containment guard to catch that.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// `..` at the root stays at the root (`/..` is `/`). For relative inputs a
/// leading `..` that cannot be popped is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Resolve a request path under `root`. The path is always root-relative,
/// even when it starts with `/`.
pub fn resolve_request(root: &Path, req_path: &str) -> PathBuf {
    normalize(&root.join(req_path.trim_start_matches('/')))
}

/// Resolve a serve target (template output or producer result) against `root`.
///
/// - relative targets are joined onto `root`;
/// - absolute targets are taken literally when the rule may leave the root,
///   or when they start with `root` (any `..` escape is left for the
///   containment guard);
/// - any other absolute target is read as root-relative, like a request path.
pub fn resolve_target(root: &Path, target: &str, allow_outside: bool) -> PathBuf {
    let candidate = Path::new(target);
    if !candidate.is_absolute() {
        return normalize(&root.join(candidate));
    }
    if allow_outside || candidate.starts_with(root) {
        normalize(candidate)
    } else {
        resolve_request(root, target)
    }
}

/// Directory part of a `/`-separated URL path. Trailing slashes are ignored,
/// `"/a"` gives `"/"` and a bare name gives `"."`.
pub fn dirname(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        None => ".",
        Some(idx) => {
            let dir = trimmed[..idx].trim_end_matches('/');
            if dir.is_empty() {
                "/"
            } else {
                dir
            }
        }
    }
}

/// Last segment of a `/`-separated URL path, ignoring trailing slashes.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Split a file name on its last `.` into `(basename, suffix)`.
///
/// Names starting with `.` (dotfiles) and names without a dot have no suffix.
pub fn split_suffix(file_name: &str) -> (&str, &str) {
    if !file_name.starts_with('.') {
        if let Some(idx) = file_name.rfind('.') {
            return (&file_name[..idx], &file_name[idx + 1..]);
        }
    }
    (file_name, "")
}
