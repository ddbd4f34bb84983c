//! Slash-separated path normalization.
//!
//! Every path the crate stores or compares goes through [`normalize`], which
//! works on the textual form only: separators become `/`, `.` segments are
//! dropped and `..` segments are folded lexically. The filesystem is never
//! consulted, so the same input yields the same key on every platform.

use std::path::Path;

/// Replaces backslash separators with forward slashes.
pub fn to_slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Converts a `Path` into its slash-separated string form.
pub fn path_string(path: &Path) -> String {
    to_slash(&path.to_string_lossy())
}

/// Splits a leading drive designator (`C:`) off a slash-separated path.
fn split_prefix(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        (&path[..2], &path[2..])
    } else {
        ("", path)
    }
}

/// Returns true if the path is rooted (`/x`, `C:/x` or `C:\x`).
pub fn is_absolute(path: &str) -> bool {
    let path = to_slash(path);
    let (_, rest) = split_prefix(&path);
    rest.starts_with('/')
}

/// Lexically normalizes a path into its canonical slash-separated form.
///
/// The result never ends with a separator unless it is a bare root, and a
/// relative path that folds away entirely becomes `"."`. Normalizing an
/// already normalized path returns it unchanged.
pub fn normalize(path: &str) -> String {
    let path = to_slash(path);
    let (prefix, rest) = split_prefix(&path);
    let rooted = rest.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                // `..` above the root stays at the root
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(path.len());
    out.push_str(prefix);
    if rooted {
        out.push('/');
    }
    out.push_str(&segments.join("/"));

    if out.is_empty() {
        out.push('.');
    }
    out
}

/// Joins `tail` onto `base` and normalizes. An absolute `tail` replaces `base`.
pub fn join(base: &str, tail: &str) -> String {
    if is_absolute(tail) {
        normalize(tail)
    } else {
        normalize(&format!("{}/{}", to_slash(base), to_slash(tail)))
    }
}

/// Makes `path` absolute against `base` (which should itself be absolute).
pub fn absolute(path: &Path, base: &Path) -> String {
    join(&path_string(base), &path_string(path))
}

/// Appends a trailing `/` so prefix tests cannot match a sibling like `FooBar`
/// against `Foo`.
pub fn slash_terminated(path: &str) -> String {
    let mut path = normalize(path);
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Expresses `path` relative to `base`, using `..` segments when `path` is
/// outside `base`. Paths with different roots are returned normalized as-is.
pub fn relative(path: &str, base: &str) -> String {
    let path = normalize(path);
    let base = normalize(base);

    let (path_prefix, path_rest) = split_prefix(&path);
    let (base_prefix, base_rest) = split_prefix(&base);
    if !path_prefix.eq_ignore_ascii_case(base_prefix)
        || path_rest.starts_with('/') != base_rest.starts_with('/')
    {
        return path;
    }

    let path_parts: Vec<&str> = path_rest.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let base_parts: Vec<&str> = base_rest.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(base_parts.len() - common));
    parts.extend(&path_parts[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Final segment of a slash-separated path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Directory part of a normalized path (`"."` for a bare relative name).
pub fn parent(path: &str) -> String {
    let path = normalize(path);
    match path.rsplit_once('/') {
        Some(("", _)) => "/".to_string(),
        Some((dir, _)) if dir.ends_with(':') => format!("{}/", dir),
        Some((dir, _)) => dir.to_string(),
        None => ".".to_string(),
    }
}
