//! Helpers for absolute, `/`-separated repository paths.

pub const SEPARATOR: char = '/';
pub const ROOT: &str = "/";

/// Area present on every resource resolver search path. Relative resource
/// paths are resolved beneath it.
pub const LIBS_PREFIX: &str = "/libs/";

/// Customization area whose paths shadow the same path below [`LIBS_PREFIX`].
pub const APPS_PREFIX: &str = "/apps/";

pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// A path ending with the separator which is not the root itself.
pub fn has_trailing_separator(path: &str) -> bool {
    path.ends_with(SEPARATOR) && path != ROOT
}

/// Parent of an absolute path, `None` for the root.
///
/// `/a/b` → `/a`, `/a` → `/`.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(0) => Some(ROOT),
        Some(index) => Some(&path[..index]),
        None => None,
    }
}

/// Iterates over all proper ancestors of `path`, nearest first, ending at the root.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(parent(path), |&current| parent(current))
}
