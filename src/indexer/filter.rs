use regex::Regex;

use crate::error::{GraphError, Result};

pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &[r".*\.cpp$", r".*\.h$", r".*\.hpp$", r".*\.c$"];
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[r".*moc_.*"];

/// Include/exclude pattern lists deciding which files get scanned.
///
/// Patterns match from the start of the path (not anywhere within it).
/// An empty include list includes everything; an empty exclude list
/// excludes nothing.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl Default for FileFilter {
    fn default() -> Self {
        // The defaults are valid patterns
        Self::new(DEFAULT_INCLUDE_PATTERNS, DEFAULT_EXCLUDE_PATTERNS)
            .unwrap_or_else(|_| Self::match_all())
    }
}

impl FileFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// A filter that processes every file.
    pub fn match_all() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn is_included(&self, path: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|r| r.is_match(path))
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|r| r.is_match(path))
    }

    /// Included and not excluded.
    pub fn accepts(&self, path: &str) -> bool {
        self.is_included(path) && !self.is_excluded(path)
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let pattern = p.as_ref();
            Regex::new(&format!("^(?:{})", pattern)).map_err(|source| GraphError::Pattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = FileFilter::default();
        assert!(filter.accepts("/sln/core/a.cpp"));
        assert!(filter.accepts("/sln/core/a.h"));
        assert!(filter.accepts("/sln/core/a.hpp"));
        assert!(filter.accepts("/sln/core/a.c"));
        assert!(!filter.accepts("/sln/core/a.cc"));
        assert!(!filter.accepts("/sln/core/README.md"));
        assert!(!filter.accepts("/sln/gui/moc_window.cpp"));
    }

    #[test]
    fn test_empty_lists() {
        let filter = FileFilter::match_all();
        assert!(filter.is_included("anything"));
        assert!(!filter.is_excluded("anything"));

        let empty: &[&str] = &[];
        let filter = FileFilter::new(empty, &[r".*\.txt$"]).unwrap();
        assert!(filter.accepts("notes.md"));
        assert!(!filter.accepts("notes.txt"));
    }

    #[test]
    fn test_patterns_are_anchored_at_start() {
        let filter = FileFilter::new(&["src/"], &["build"]).unwrap();
        assert!(filter.accepts("src/main.c"));
        assert!(!filter.is_included("lib/src/main.c"));
        // an exclude pattern only matches at the start too
        assert!(!filter.is_excluded("src/build/x.c"));
        assert!(filter.is_excluded("build/x.c"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let filter = FileFilter::new(&["a|b"], &[]).unwrap();
        assert!(filter.is_included("bx"));
        assert!(!filter.is_included("xb"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FileFilter::new(&["(unclosed"], &[]).unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }
}
