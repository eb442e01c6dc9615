//! Lexical path utilities for item paths on nodes
//!
//! Item paths describe locations on the managed node, not on this machine,
//! so they are handled as plain POSIX strings and never touch the local
//! filesystem.

/// Normalize a POSIX path lexically.
///
/// Collapses repeated separators, removes `.` components and resolves `..`
/// against preceding components. A leading `..` is kept for relative paths
/// and dropped at the root. The empty path normalizes to `.`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normpath("/var//www/./html/../"), "/var/www");
/// assert_eq!(normpath("/.."), "/");
/// assert_eq!(normpath("a/../.."), "..");
/// ```
pub fn normpath(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let mut components: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if components.last().is_some_and(|last| *last != "..") {
                    components.pop();
                } else if !absolute {
                    components.push("..");
                }
            }
            other => components.push(other),
        }
    }

    let joined = components.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Whether `child` lies strictly below the directory `parent`.
pub fn is_subdirectory(parent: &str, child: &str) -> bool {
    let parent = normpath(parent);
    let child = normpath(child);
    if parent == child {
        return false;
    }
    if parent == "/" {
        return child.starts_with('/');
    }
    child
        .strip_prefix(parent.as_str())
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Directory part of a path, like `dirname(1)`
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(index) => &path[..index],
        None => ".",
    }
}

/// Final component of a path
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
