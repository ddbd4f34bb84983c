//! Declared projects and path-to-project attribution.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{GraphError, Result};

use super::paths;

/// A named, path-delimited part of the solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Unique project name
    pub name: String,
    /// Root directory (normalized, absolute once registered)
    pub root: String,
    /// Directory searched for `#include` targets, if the project exports one
    pub include_path: Option<String>,
    /// Names of the projects this one declares it depends on
    pub dependencies: Vec<String>,
    /// Declaration order, used for tie-breaks and display order
    pub rank: usize,
    /// Name of the group the project was declared in
    pub group: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            include_path: None,
            dependencies: Vec::new(),
            rank: 0,
            group: None,
        }
    }

    pub fn with_include_path(mut self, path: impl Into<String>) -> Self {
        self.include_path = Some(path.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A named set of projects, used only to group rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectGroup {
    pub name: String,
    pub description: Option<String>,
    pub path_prefix: Option<String>,
    /// Member project names in declaration order
    pub projects: Vec<String>,
}

/// Registered projects of one solution, in declaration order.
#[derive(Debug, Clone)]
pub struct ProjectRegistry {
    solution_root: String,
    projects: Vec<Project>,
    by_name: HashMap<String, usize>,
}

impl ProjectRegistry {
    pub fn new(solution_root: &str) -> Self {
        Self {
            solution_root: paths::normalize(solution_root),
            projects: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Registers a project, normalizing its paths against the solution root
    /// and assigning the next declaration rank.
    ///
    /// Duplicate names and duplicate roots are configuration errors.
    pub fn register(&mut self, mut project: Project) -> Result<&Project> {
        if self.by_name.contains_key(&project.name) {
            return Err(GraphError::Config(format!(
                "project \"{}\" is declared more than once",
                project.name
            )));
        }

        project.root = paths::join(&self.solution_root, &project.root);
        project.include_path = project
            .include_path
            .filter(|p| !p.is_empty())
            .map(|p| paths::join(&self.solution_root, &p));

        if let Some(other) = self.projects.iter().find(|p| p.root == project.root) {
            return Err(GraphError::Config(format!(
                "projects \"{}\" and \"{}\" share the root {}",
                other.name, project.name, project.root
            )));
        }

        project.rank = self.projects.len();
        self.by_name.insert(project.name.clone(), project.rank);
        self.projects.push(project);
        Ok(&self.projects[self.projects.len() - 1])
    }

    pub fn solution_root(&self) -> &str {
        &self.solution_root
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, name: &str) -> Option<&Project> {
        self.by_name.get(name).map(|&i| &self.projects[i])
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Finds the project owning `path`: the one whose root is the longest
    /// prefix of the path. Relative paths are taken against the solution root.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        let query = paths::slash_terminated(&paths::join(&self.solution_root, path));

        let mut best: Option<(&Project, usize)> = None;
        for project in &self.projects {
            let root = paths::slash_terminated(&project.root);
            if query.starts_with(&root) && best.map_or(true, |(_, len)| root.len() > len) {
                best = Some((project, root.len()));
            }
        }

        best.map(|(project, _)| project.name.as_str())
    }

    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Path relative to the solution root, slash-separated.
    pub fn relative_path(&self, path: &str) -> String {
        paths::relative(&paths::join(&self.solution_root, path), &self.solution_root)
    }

    /// Whether `project` declares `dependency`; `None` for an unknown project.
    pub fn has_dependency(&self, project: &str, dependency: &str) -> Option<bool> {
        self.get(project)
            .map(|p| p.dependencies.iter().any(|d| d == dependency))
    }

    /// Whether `dependent` declares `project`; `None` for an unknown dependent.
    pub fn has_dependent(&self, project: &str, dependent: &str) -> Option<bool> {
        self.has_dependency(dependent, project)
    }

    /// Reports project roots and include paths that are not directories.
    pub fn validate(&self, diagnostics: &mut Diagnostics) {
        for project in &self.projects {
            if !Path::new(&project.root).is_dir() {
                diagnostics.report(Diagnostic::MissingProjectRoot {
                    project: project.name.clone(),
                    path: project.root.clone(),
                });
            }
            if let Some(include) = &project.include_path {
                if !Path::new(include).is_dir() {
                    diagnostics.report(Diagnostic::MissingIncludePath {
                        project: project.name.clone(),
                        path: include.clone(),
                    });
                }
            }
        }
    }
}
