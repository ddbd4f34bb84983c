//! TOML configuration: where the sources live, which files to scan, where
//! the store goes, and the project groups of the solution.
//!
//! Parsing happens here once; the rest of the crate only sees the validated
//! [`Solution`] built from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{GraphError, Result};
use crate::index::sqlite::MEMORY_LOCATION;
use crate::indexer::{
    FileFilter, DEFAULT_COMMIT_INTERVAL, DEFAULT_EXCLUDE_PATTERNS, DEFAULT_INCLUDE_PATTERNS,
};
use crate::solution::{paths, Project, ProjectGroup, ProjectRegistry};

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "include-graph.toml";

const EXAMPLE_CONFIG: &str = r#"# include-graph configuration

[output]
# Store location. ":memory:" keeps the store in memory for a single run;
# use a file name to keep it around for `--reuse-database`, `includes`
# and `stats`.
database = "include-graph.db"
# Processed files between two commits of the store.
commit_interval = 1000

[paths]
# Root of the source tree, relative to this file.
source_root = "."

[file_filter]
# Regular expressions matched from the start of each absolute file path.
# An empty include list scans every file.
include_patterns = ['.*\.cpp$', '.*\.h$', '.*\.hpp$', '.*\.c$']
exclude_patterns = ['.*moc_.*']

# Projects are declared in groups. The declaration order is the project's
# hierarchy level and decides which include path wins when a header is
# found under several of them.
[[groups]]
name = "Core"
description = "Building blocks shared by every application"
path_prefix = "libs"

[[groups.projects]]
name = "First"
path = "first"
include_path = "first/include"
dependencies = []

[[groups.projects]]
name = "Second"
path = "second"
include_path = "second/include"
dependencies = ["First"]

[[groups]]
name = "Applications"
description = "Executables"

[[groups.projects]]
name = "Third"
path = "apps/third"
dependencies = ["Second", "First"]
"#;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output: OutputSettings,
    pub paths: PathSettings,
    pub file_filter: FilterSettings,
    pub groups: Vec<GroupSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub database: String,
    pub commit_interval: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            database: MEMORY_LOCATION.to_string(),
            commit_interval: DEFAULT_COMMIT_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub source_root: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            source_root: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            include_patterns: DEFAULT_INCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSettings {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Directory the member project paths are relative to
    #[serde(default)]
    pub path_prefix: Option<String>,
    #[serde(default)]
    pub projects: Vec<ProjectSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub include_path: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<String>,
    /// Source root, relative to the working directory
    pub source_path: Option<PathBuf>,
}

/// Everything a scan or query needs, validated.
#[derive(Debug, Clone)]
pub struct Solution {
    pub registry: ProjectRegistry,
    pub groups: Vec<ProjectGroup>,
    pub filter: FileFilter,
    pub database: String,
    pub commit_interval: usize,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| GraphError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parses TOML text; `origin` names the source in error messages.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| GraphError::ConfigParse {
            path: origin.to_string(),
            source,
        })
    }

    /// A commented configuration listing every option.
    pub fn example() -> &'static str {
        EXAMPLE_CONFIG
    }

    /// Builds the validated solution.
    ///
    /// `config_dir` anchors the relative `source_root`; it is itself taken
    /// relative to the working directory. Unknown or duplicate project names
    /// are errors. Directories missing on disk are only reported.
    pub fn into_solution(
        self,
        config_dir: &Path,
        overrides: &Overrides,
        diagnostics: &mut Diagnostics,
    ) -> Result<Solution> {
        let cwd = std::env::current_dir()?;
        let solution_root = match &overrides.source_path {
            Some(source) => paths::absolute(source, &cwd),
            None => paths::join(
                &paths::absolute(config_dir, &cwd),
                &self.paths.source_root,
            ),
        };
        tracing::info!("Source path: {}", solution_root);

        let mut registry = ProjectRegistry::new(&solution_root);
        let mut groups = Vec::with_capacity(self.groups.len());

        for group in self.groups {
            let prefix = group
                .path_prefix
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| paths::join(&solution_root, p));
            if let Some(prefix) = &prefix {
                if !Path::new(prefix).is_dir() {
                    diagnostics.report(Diagnostic::MissingGroupPrefix {
                        group: group.name.clone(),
                        path: prefix.clone(),
                    });
                }
            }
            let base = prefix.clone().unwrap_or_else(|| solution_root.clone());

            let mut members = Vec::with_capacity(group.projects.len());
            for project in group.projects {
                let mut entry = Project::new(&project.name, paths::join(&base, &project.path))
                    .with_dependencies(project.dependencies)
                    .in_group(&group.name);
                if let Some(include) = project.include_path.filter(|p| !p.is_empty()) {
                    entry = entry.with_include_path(paths::join(&base, &include));
                }
                registry.register(entry)?;
                members.push(project.name);
            }

            groups.push(ProjectGroup {
                name: group.name,
                description: group.description,
                path_prefix: prefix,
                projects: members,
            });
        }

        check_dependencies(&registry)?;
        registry.validate(diagnostics);

        let filter = FileFilter::new(
            &self.file_filter.include_patterns,
            &self.file_filter.exclude_patterns,
        )?;
        let database = overrides
            .database
            .clone()
            .unwrap_or(self.output.database);

        Ok(Solution {
            registry,
            groups,
            filter,
            database,
            commit_interval: self.output.commit_interval,
        })
    }
}

fn check_dependencies(registry: &ProjectRegistry) -> Result<()> {
    for project in registry.projects() {
        if let Some(unknown) = project
            .dependencies
            .iter()
            .find(|d| registry.get(d).is_none())
        {
            return Err(GraphError::Config(format!(
                "project \"{}\" depends on unknown project \"{}\"",
                project.name, unknown
            )));
        }
    }
    Ok(())
}
