//! Per-run diagnostics context.
//!
//! A `Diagnostics` value is created once per run and handed by reference to
//! every component that reports recoverable problems. It owns the run clock
//! and keeps every report so callers and tests can inspect them.

use std::fmt;
use std::time::{Duration, Instant};

/// A recoverable problem found while configuring, scanning or querying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    MissingProjectRoot {
        project: String,
        path: String,
    },
    MissingIncludePath {
        project: String,
        path: String,
    },
    MissingGroupPrefix {
        group: String,
        path: String,
    },
    /// Include text written with `\` separators; it was stored normalized.
    NonPosixInclude {
        file: String,
        text: String,
    },
    /// Include text found under several project include paths. The first
    /// candidate (registry order) was selected.
    AmbiguousInclude {
        file: String,
        text: String,
        candidates: Vec<String>,
    },
    UnknownProject {
        name: String,
    },
    UnreadableEntry {
        path: String,
        message: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingProjectRoot { project, path } => {
                write!(f, "The project \"{}\" path \"{}\" does not exist.", project, path)
            }
            Diagnostic::MissingIncludePath { project, path } => write!(
                f,
                "The project \"{}\" include-path \"{}\" does not exist.",
                project, path
            ),
            Diagnostic::MissingGroupPrefix { group, path } => write!(
                f,
                "The group \"{}\" path-prefix \"{}\" does not exist.",
                group, path
            ),
            Diagnostic::NonPosixInclude { file, text } => write!(
                f,
                "#include directive with non-posix path {} included in {}",
                text, file
            ),
            Diagnostic::AmbiguousInclude {
                file,
                text,
                candidates,
            } => {
                write!(f, "include text \"{}\" in {} matches multiple files:", text, file)?;
                for (i, candidate) in candidates.iter().enumerate() {
                    if i == 0 {
                        write!(f, "\n  {} (selected)", candidate)?;
                    } else {
                        write!(f, "\n  {}", candidate)?;
                    }
                }
                Ok(())
            }
            Diagnostic::UnknownProject { name } => write!(
                f,
                "Couldn't find {} dependencies. Are you sure the project exists?",
                name
            ),
            Diagnostic::UnreadableEntry { path, message } => {
                write!(f, "Skipping unreadable entry {}: {}", path, message)
            }
        }
    }
}

#[derive(Debug)]
pub struct Diagnostics {
    started_at: Instant,
    reports: Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            reports: Vec::new(),
        }
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Logs the diagnostic and keeps it.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(elapsed_s = self.elapsed().as_secs_f64(), "{}", diagnostic);
        self.reports.push(diagnostic);
    }

    pub fn reports(&self) -> &[Diagnostic] {
        &self.reports
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn ambiguities(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reports
            .iter()
            .filter(|d| matches!(d, Diagnostic::AmbiguousInclude { .. }))
    }
}
