pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod index;
pub mod indexer;
pub mod render;
pub mod solution;

pub use config::{Overrides, Settings, Solution};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{GraphError, Result};
pub use graph::{
    all_projects, evaluate_selectors, leaf_projects, top_level_projects, transitive_dependencies,
    DependencyTree, ProjectSelector,
};
pub use index::sqlite::SqliteStore;
pub use index::{
    CodeFileRecord, DependencyStore, DirectiveFilter, IncludeDirectiveRecord, IncludeKind,
    ProjectRecord, StoreStats,
};
pub use indexer::{FileFilter, IncludeResolver, ScanOptions, ScanSummary, SolutionScanner};
pub use solution::{Project, ProjectGroup, ProjectRegistry};
