use serde::{Deserialize, Serialize};

/// Bracket style of an `#include` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeKind {
    /// `#include "file.h"`
    Local,
    /// `#include <file.h>`
    System,
}

impl IncludeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncludeKind::Local => "local",
            IncludeKind::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" => Some(IncludeKind::Local),
            "system" => Some(IncludeKind::System),
            _ => None,
        }
    }
}

/// Row of the `Project` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Project root relative to the solution root
    pub solution_path: String,
    pub name: String,
    /// Declaration rank
    pub hierarchy_level: i64,
}

/// Row of the `CodeFile` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFileRecord {
    /// Path relative to the solution root; the primary key
    pub solution_path: String,
    /// Owning project, if any project root contains the file
    pub project: Option<String>,
    pub filename: String,
}

/// Row of the `IncludeDirective` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeDirectiveRecord {
    /// Including file, relative to the solution root
    pub code_file: String,
    /// Include text as written, with `/` separators
    pub text: String,
    pub kind: IncludeKind,
    /// Final segment of the include text
    pub filename: String,
    /// Project owning the resolved target
    pub project: Option<String>,
    /// Resolved target, relative to the solution root
    pub solution_path: Option<String>,
    /// 1-based line of the directive
    pub line: u32,
}

impl IncludeDirectiveRecord {
    pub fn is_resolved(&self) -> bool {
        self.solution_path.is_some()
    }
}

/// Read filter for [`crate::index::DependencyStore::include_directives`].
#[derive(Debug, Clone, Default)]
pub struct DirectiveFilter {
    pub kind: Option<IncludeKind>,
    /// Only directives whose target belongs to this project
    pub target_project: Option<String>,
    /// Only directives that did not resolve to any file
    pub unresolved_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub projects: usize,
    pub code_files: usize,
    pub attributed_files: usize,
    pub include_directives: usize,
    pub resolved_directives: usize,
}
