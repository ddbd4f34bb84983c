//! Output formats for a dependency query result.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::error::Result;
use crate::graph::{DependencyTree, ProjectSelector};
use crate::solution::ProjectGroup;

const INDENT: &str = "  ";

/// Graph name used when several selectors are combined.
pub const COMBINED_GRAPH_NAME: &str = "inc_dep";

/// Node style emitted at the top of the group hints.
pub const NODE_STYLE: &str = "node [fontcolor=black shape=box style=filled fillcolor=dodgerblue1];";

/// One project per line, sorted.
pub fn render_list(projects: &BTreeSet<String>) -> String {
    let mut out = String::new();
    for project in projects {
        out.push_str(project);
        out.push('\n');
    }
    out
}

/// Sorted JSON array of project names.
pub fn render_json(projects: &BTreeSet<String>) -> Result<String> {
    let list: Vec<&str> = projects.iter().map(String::as_str).collect();
    Ok(serde_json::to_string_pretty(&list)?)
}

pub fn graph_name(selectors: &[ProjectSelector]) -> &str {
    match selectors {
        [single] => single.graph_name(),
        _ => COMBINED_GRAPH_NAME,
    }
}

/// Projects drawn in a dot graph: the explicitly named projects first (in
/// argument order), then the query result, sorted. Each appears once.
pub fn listed_projects(selectors: &[ProjectSelector], projects: &BTreeSet<String>) -> Vec<String> {
    let mut listed: Vec<String> = Vec::with_capacity(selectors.len() + projects.len());
    let named = selectors.iter().filter_map(ProjectSelector::project_name);
    for name in named.chain(projects.iter().map(String::as_str)) {
        if !listed.iter().any(|p| p == name) {
            listed.push(name.to_string());
        }
    }
    listed
}

/// Dot digraph of the listed projects.
///
/// Only edges between listed projects are drawn; a listed project without
/// such an edge is still emitted as a bare node. `preamble` (node styles,
/// group hints) is copied in before the edges.
pub fn render_dot(
    tree: &DependencyTree,
    selectors: &[ProjectSelector],
    projects: &BTreeSet<String>,
    preamble: Option<&str>,
) -> String {
    let listed = listed_projects(selectors, projects);
    let mut out = String::new();

    let _ = writeln!(out, "digraph {} {{", quote(graph_name(selectors)));
    if let Some(preamble) = preamble {
        out.push_str(preamble);
        if !preamble.ends_with('\n') {
            out.push('\n');
        }
    }

    for project in &listed {
        let mut drew_edge = false;
        if let Some(dependencies) = tree.direct(project) {
            for dependency in dependencies.iter().filter(|d| listed.contains(*d)) {
                let _ = writeln!(out, "{}{} -> {};", INDENT, quote(project), quote(dependency));
                drew_edge = true;
            }
        }
        if !drew_edge {
            let _ = writeln!(out, "{}{};", INDENT, quote(project));
        }
    }

    out.push_str("}\n");
    out
}

/// Example dot preamble: the node style plus one `rank = same` subgraph per
/// group that has members in `projects`.
pub fn render_group_hints(projects: &BTreeSet<String>, groups: &[ProjectGroup]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}{}", INDENT, NODE_STYLE);

    for (index, group) in groups.iter().enumerate() {
        let members: BTreeSet<&str> = group
            .projects
            .iter()
            .map(String::as_str)
            .filter(|p| projects.contains(*p))
            .collect();
        if members.is_empty() {
            continue;
        }

        let mut name: String = group.name.chars().filter(char::is_ascii_alphanumeric).collect();
        if name.is_empty() {
            name = format!("group{}", index);
        }

        let _ = writeln!(out, "{}subgraph {} {{", INDENT, name);
        let _ = writeln!(out, "{}{}rank = same;", INDENT, INDENT);
        for member in members {
            let _ = writeln!(out, "{}{}{};", INDENT, INDENT, quote(member));
        }
        let _ = writeln!(out, "{}}}", INDENT);
    }

    out
}

/// Quotes a dot identifier.
fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}
