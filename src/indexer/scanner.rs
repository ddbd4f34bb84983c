//! Line-based `#include` extraction.
//!
//! A line counts only if, after leading blanks, it reads `#include`, at least
//! one blank, then a `"..."` or `<...>` token. Anything else (macro includes,
//! `# include`, token pasting) is skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GraphError, Result};

static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[ \t]*#include[ \t]+(?:<([^>]*)>|"([^"]*)")"#)
        .expect("include pattern is a valid regex")
});

/// Include text with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeText {
    pub text: String,
    pub line: u32,
}

impl IncludeText {
    pub fn new(text: impl Into<String>, line: u32) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }
}

/// Includes of one file, split by bracket kind, each in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedIncludes {
    pub local: Vec<IncludeText>,
    pub system: Vec<IncludeText>,
}

impl ScannedIncludes {
    pub fn len(&self) -> usize {
        self.local.len() + self.system.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.system.is_empty()
    }
}

/// Classifies a single line.
pub fn parse_line(line: &str) -> Option<(bool, &str)> {
    let captures = INCLUDE_RE.captures(line)?;
    if let Some(system) = captures.get(1) {
        Some((false, system.as_str()))
    } else {
        captures.get(2).map(|local| (true, local.as_str()))
    }
}

/// Extracts the includes of `reader` line by line. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn scan_reader<R: BufRead>(mut reader: R) -> std::io::Result<ScannedIncludes> {
    let mut includes = ScannedIncludes::default();
    let mut buf = Vec::new();
    let mut line_number = 0u32;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let line = String::from_utf8_lossy(&buf);
        match parse_line(&line) {
            Some((true, text)) => includes.local.push(IncludeText::new(text, line_number)),
            Some((false, text)) => includes.system.push(IncludeText::new(text, line_number)),
            None => {}
        }
    }

    Ok(includes)
}

/// Scans a file on disk. Failing to open or read it is fatal for the run.
pub fn scan_file(path: &Path) -> Result<ScannedIncludes> {
    let read_error = |source| GraphError::SourceRead {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    scan_reader(BufReader::new(file)).map_err(read_error)
}
