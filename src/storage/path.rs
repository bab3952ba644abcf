//! Normalization of user-supplied document paths.

/// Collapse a slash-separated path into a safe relative form.
///
/// Empty, `.` and `..` segments are dropped rather than rejected, so
/// `"a/../b"` becomes `"a/b"`. An empty result means nothing usable was
/// left and callers treat it as an invalid path.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/")
}

/// Final segment of a normalized path, used as the fallback document title.
pub fn file_stem(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
