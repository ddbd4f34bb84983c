//! Project dependency graph derived from the store, and the queries on it.

pub mod closure;

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

pub use closure::{
    all_projects, evaluate_selectors, expand_once, leaf_projects, top_level_projects,
    transitive_dependencies, ProjectSelector,
};

/// Adjacency mapping: project -> projects it directly includes from.
///
/// Keys keep the order in which each project first appeared. A project only
/// has a key if at least one of its files includes a header attributed to
/// some project (possibly itself).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTree {
    order: Vec<String>,
    edges: HashMap<String, BTreeSet<String>>,
}

impl DependencyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the mapping from (including project, included project) pairs.
    /// Repeated pairs collapse and self-pairs are removed once all pairs are
    /// in, so a project that only includes itself still gets an empty entry.
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut tree = Self::new();
        for (project, dependency) in pairs {
            let project = project.into();
            tree.entry(project).insert(dependency.into());
        }
        for (project, dependencies) in tree.edges.iter_mut() {
            dependencies.remove(project);
        }
        tree
    }

    fn entry(&mut self, project: String) -> &mut BTreeSet<String> {
        if !self.edges.contains_key(&project) {
            self.order.push(project.clone());
        }
        self.edges.entry(project).or_default()
    }

    /// Direct dependencies of `project`, or `None` if it has no entry.
    pub fn direct(&self, project: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(project)
    }

    /// Direct dependencies of `project`; empty for an unknown project.
    pub fn direct_dependencies(&self, project: &str) -> BTreeSet<String> {
        self.direct(project).cloned().unwrap_or_default()
    }

    pub fn contains(&self, project: &str) -> bool {
        self.edges.contains_key(project)
    }

    /// Projects with an entry, in first-appearance order.
    pub fn projects(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.order
            .iter()
            .filter_map(|p| self.edges.get(p).map(|deps| (p.as_str(), deps)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }
}

impl Serialize for DependencyTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (project, dependencies) in self.iter() {
            map.serialize_entry(project, dependencies)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_keeps_first_appearance_order() {
        let tree = DependencyTree::from_pairs([("B", "A"), ("A", "C"), ("B", "C")]);
        assert_eq!(tree.projects().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(tree.edge_count(), 3);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let tree = DependencyTree::from_pairs([("A", "B"), ("A", "B"), ("A", "B")]);
        assert_eq!(tree.direct_dependencies("A").len(), 1);
    }

    #[test]
    fn test_self_edges_never_appear() {
        let tree = DependencyTree::from_pairs([("A", "A"), ("A", "B"), ("B", "B")]);
        for (project, dependencies) in tree.iter() {
            assert!(!dependencies.contains(project), "self edge on {}", project);
        }
        assert!(tree.contains("B"));
        assert!(tree.direct_dependencies("B").is_empty());
    }

    #[test]
    fn test_unknown_project_has_no_dependencies() {
        let tree = DependencyTree::from_pairs([("A", "B")]);
        assert!(tree.direct("Z").is_none());
        assert!(tree.direct_dependencies("Z").is_empty());
        // B is only a target, so it has no entry
        assert!(!tree.contains("B"));
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let tree = DependencyTree::from_pairs([("Second", "First"), ("First", "First")]);
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"Second":["First"],"First":[]}"#);
    }
}
