//! Reachability and derived project sets over a [`DependencyTree`].

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::{Diagnostic, Diagnostics};

use super::DependencyTree;

/// Dependencies of members of `set` that are not yet in `set`.
pub fn expand_once(tree: &DependencyTree, set: &BTreeSet<String>) -> BTreeSet<String> {
    set.iter()
        .filter_map(|project| tree.direct(project))
        .flatten()
        .filter(|dependency| !set.contains(*dependency))
        .cloned()
        .collect()
}

/// Everything `target` reaches through direct dependencies, excluding
/// `target` itself even when a cycle leads back to it.
pub fn transitive_dependencies(tree: &DependencyTree, target: &str) -> BTreeSet<String> {
    let mut reached = BTreeSet::from([target.to_string()]);

    loop {
        let added = expand_once(tree, &reached);
        if added.is_empty() {
            break;
        }
        reached.extend(added);
    }

    reached.remove(target);
    reached
}

/// Every project with an entry in the mapping.
pub fn all_projects(tree: &DependencyTree) -> BTreeSet<String> {
    tree.projects().map(String::from).collect()
}

/// Projects no other project lists as a direct dependency.
pub fn top_level_projects(tree: &DependencyTree) -> BTreeSet<String> {
    let mut candidates = all_projects(tree);
    for (_, dependencies) in tree.iter() {
        for dependency in dependencies {
            candidates.remove(dependency);
        }
    }
    candidates
}

/// Projects with an empty direct-dependency set.
pub fn leaf_projects(tree: &DependencyTree) -> BTreeSet<String> {
    tree.iter()
        .filter(|(_, dependencies)| dependencies.is_empty())
        .map(|(project, _)| project.to_string())
        .collect()
}

/// One project argument of a dependency query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSelector {
    /// `?`: every known project
    All,
    /// `^`: projects nothing depends on
    TopLevel,
    /// `~`: projects that depend on nothing
    Leaves,
    /// Dependencies of the named project
    Project(String),
}

impl FromStr for ProjectSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "?" => ProjectSelector::All,
            "^" => ProjectSelector::TopLevel,
            "~" => ProjectSelector::Leaves,
            name => ProjectSelector::Project(name.to_string()),
        })
    }
}

impl fmt::Display for ProjectSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectSelector::All => f.write_str("?"),
            ProjectSelector::TopLevel => f.write_str("^"),
            ProjectSelector::Leaves => f.write_str("~"),
            ProjectSelector::Project(name) => f.write_str(name),
        }
    }
}

impl ProjectSelector {
    /// Graph name used when this is the only selector of a dot rendering.
    pub fn graph_name(&self) -> &str {
        match self {
            ProjectSelector::All => "all_projects",
            ProjectSelector::TopLevel => "top_level_projects",
            ProjectSelector::Leaves => "core_building_blocks",
            ProjectSelector::Project(name) => name.as_str(),
        }
    }

    pub fn project_name(&self) -> Option<&str> {
        match self {
            ProjectSelector::Project(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Evaluates the selector. A named project unknown to the mapping yields
    /// an empty set and a diagnostic.
    pub fn evaluate(
        &self,
        tree: &DependencyTree,
        direct_only: bool,
        diagnostics: &mut Diagnostics,
    ) -> BTreeSet<String> {
        match self {
            ProjectSelector::All => all_projects(tree),
            ProjectSelector::TopLevel => top_level_projects(tree),
            ProjectSelector::Leaves => leaf_projects(tree),
            ProjectSelector::Project(name) => {
                if !tree.contains(name) {
                    diagnostics.report(Diagnostic::UnknownProject { name: name.clone() });
                    return BTreeSet::new();
                }
                tracing::info!("Building dependency list for {}", name);
                if direct_only {
                    tree.direct_dependencies(name)
                } else {
                    transitive_dependencies(tree, name)
                }
            }
        }
    }
}

/// Union of all selector results.
pub fn evaluate_selectors(
    selectors: &[ProjectSelector],
    tree: &DependencyTree,
    direct_only: bool,
    diagnostics: &mut Diagnostics,
) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    for selector in selectors {
        result.extend(selector.evaluate(tree, direct_only, diagnostics));
    }
    tracing::info!("Found {} dependencies.", result.len());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn chain() -> DependencyTree {
        // Third -> Second -> First, Third -> First
        DependencyTree::from_pairs([
            ("First", "First"),
            ("Second", "First"),
            ("Third", "Second"),
            ("Third", "First"),
        ])
    }

    fn cyclic() -> DependencyTree {
        DependencyTree::from_pairs([("A", "B"), ("B", "C"), ("C", "A"), ("C", "D"), ("D", "D")])
    }

    #[test]
    fn test_transitive_follows_chain() {
        let tree = chain();
        assert_eq!(transitive_dependencies(&tree, "Second"), set(&["First"]));
        assert_eq!(transitive_dependencies(&tree, "Third"), set(&["First", "Second"]));
        assert!(transitive_dependencies(&tree, "First").is_empty());
    }

    #[test]
    fn test_transitive_tolerates_cycles_and_excludes_target() {
        let tree = cyclic();
        assert_eq!(transitive_dependencies(&tree, "A"), set(&["B", "C", "D"]));
        assert_eq!(transitive_dependencies(&tree, "C"), set(&["A", "B", "D"]));
    }

    #[test]
    fn test_closure_is_a_fixpoint() {
        for tree in [chain(), cyclic()] {
            for project in tree.projects() {
                let mut closure = transitive_dependencies(&tree, project);
                closure.insert(project.to_string());
                assert!(
                    expand_once(&tree, &closure).is_empty(),
                    "closure of {} is not closed",
                    project
                );
            }
        }
    }

    #[test]
    fn test_transitive_of_unknown_project_is_empty() {
        assert!(transitive_dependencies(&chain(), "Nope").is_empty());
    }

    #[test]
    fn test_derived_sets() {
        let tree = chain();
        assert_eq!(all_projects(&tree), set(&["First", "Second", "Third"]));
        assert_eq!(top_level_projects(&tree), set(&["Third"]));
        assert_eq!(leaf_projects(&tree), set(&["First"]));
    }

    #[test]
    fn test_isolated_project_is_both_top_level_and_leaf() {
        let tree = DependencyTree::from_pairs([("Loner", "Loner"), ("App", "Lib"), ("Lib", "Lib")]);
        let top = top_level_projects(&tree);
        let leaves = leaf_projects(&tree);
        assert!(top.contains("Loner"));
        assert!(leaves.contains("Loner"));
        assert_eq!(top.intersection(&leaves).cloned().collect::<Vec<_>>(), vec!["Loner"]);
    }

    #[test]
    fn test_cycle_has_no_top_level_members() {
        let tree = cyclic();
        assert!(top_level_projects(&tree).is_empty());
        assert_eq!(leaf_projects(&tree), set(&["D"]));
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("?".parse::<ProjectSelector>().unwrap(), ProjectSelector::All);
        assert_eq!("^".parse::<ProjectSelector>().unwrap(), ProjectSelector::TopLevel);
        assert_eq!("~".parse::<ProjectSelector>().unwrap(), ProjectSelector::Leaves);
        assert_eq!(
            "Core".parse::<ProjectSelector>().unwrap(),
            ProjectSelector::Project("Core".to_string())
        );
        assert_eq!(ProjectSelector::Leaves.graph_name(), "core_building_blocks");
    }

    #[test]
    fn test_selector_direct_vs_transitive() {
        let tree = DependencyTree::from_pairs([("C", "B"), ("B", "A"), ("A", "A")]);
        let mut diagnostics = Diagnostics::new();
        let selector = ProjectSelector::Project("C".to_string());

        assert_eq!(selector.evaluate(&tree, true, &mut diagnostics), set(&["B"]));
        assert_eq!(selector.evaluate(&tree, false, &mut diagnostics), set(&["A", "B"]));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_project_is_reported_not_fatal() {
        let tree = chain();
        let mut diagnostics = Diagnostics::new();
        let result = ProjectSelector::Project("Ghost".to_string()).evaluate(&tree, true, &mut diagnostics);

        assert!(result.is_empty());
        assert_eq!(
            diagnostics.reports(),
            &[Diagnostic::UnknownProject {
                name: "Ghost".to_string()
            }]
        );
    }

    #[test]
    fn test_selectors_union() {
        let tree = chain();
        let mut diagnostics = Diagnostics::new();
        let selectors = vec![ProjectSelector::TopLevel, ProjectSelector::Leaves];
        assert_eq!(
            evaluate_selectors(&selectors, &tree, false, &mut diagnostics),
            set(&["First", "Third"])
        );
    }
}
