//! Slash-normalized path helpers shared by the comparator and the tree view.
//!
//! Listings arrive with host-native separators; everything that keys on a
//! relative path goes through [`normalize_separators`] first so that a tree
//! listed on Windows compares against one listed on Unix.

pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Last non-empty segment of `path`, or `None` for an empty path or one that
/// ends in a separator.
pub fn base_name(path: &str) -> Option<&str> {
    let segment = path.rsplit(['/', '\\']).next()?;
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Path of `full_path` relative to `root_path`, with forward slashes and no
/// leading separator.
///
/// Entries that are not under the root (or that are the root itself) fall
/// back to their base name.
pub fn relative_path(full_path: &str, root_path: &str) -> String {
    let full = normalize_separators(full_path);
    let root = normalize_separators(root_path);
    let root = root.trim_end_matches('/');

    if let Some(rest) = full.strip_prefix(root) {
        if rest.is_empty() || rest.starts_with('/') || root.is_empty() {
            let relative = rest.trim_start_matches('/');
            if !relative.is_empty() {
                return relative.to_string();
            }
        }
    }

    base_name(&full).unwrap_or(full.as_str()).to_string()
}

/// Relative path of the directory holding `relative_path`; `""` for
/// top-level entries.
pub fn parent_relative_path(relative_path: &str) -> &str {
    match relative_path.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

/// Nesting depth of a relative path: `0` for top-level entries.
pub fn depth_of(relative_path: &str) -> usize {
    relative_path.matches('/').count()
}
