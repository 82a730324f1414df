// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Lexical path cleaning
//
// Works on '/'-separated strings (URL paths and the cleaned share path),
// without touching the filesystem.

/// Return the shortest path equivalent to `path` by purely lexical processing.
///
/// Repeated separators collapse to one, `.` elements are dropped, and each
/// `..` removes the element before it. A `..` at the start of a rooted path
/// is dropped; at the start of a relative path it is kept. Trailing
/// separators are removed. An empty result becomes `.` (or `/` if rooted).
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for element in path.split('/') {
        match element {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Whether `path` is already in cleaned form
pub fn is_clean(path: &str) -> bool {
    clean(path) == path
}

/// Last element of a cleaned path, `.` for an empty path and `/` for the root
pub fn base(path: &str) -> String {
    let cleaned = clean(path);
    if cleaned == "/" {
        return cleaned;
    }
    cleaned
        .rsplit('/')
        .next()
        .map(|s| s.to_string())
        .unwrap_or(cleaned)
}
