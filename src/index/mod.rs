pub mod models;
pub mod schema;
pub mod sqlite;

use crate::error::Result;
use crate::graph::DependencyTree;
pub use models::*;

/// Persistent store of projects, code files and include directives.
///
/// Writes are batched: the first write after a commit starts a batch that
/// `commit` makes durable and `abort` discards. Committed batches survive
/// an aborted or interrupted one.
pub trait DependencyStore {
    /// Clears all three record kinds. Always precedes a fresh scan; the store
    /// itself never deduplicates include directives.
    fn reset(&mut self) -> Result<()>;
    /// Inserts or updates a project keyed by its solution path.
    fn put_project(&mut self, project: &ProjectRecord) -> Result<()>;
    /// Inserts or updates a code file keyed by its solution path.
    fn put_code_file(&mut self, file: &CodeFileRecord) -> Result<()>;
    fn put_include_directive(&mut self, directive: &IncludeDirectiveRecord) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn abort(&mut self) -> Result<()>;

    /// Projects ordered by hierarchy level.
    fn projects(&self) -> Result<Vec<ProjectRecord>>;
    fn get_code_file(&self, solution_path: &str) -> Result<Option<CodeFileRecord>>;
    fn code_files_ending_with(&self, suffix: &str) -> Result<Vec<CodeFileRecord>>;
    /// Directives found in files owned by `source_project`.
    fn include_directives(
        &self,
        source_project: &str,
        filter: &DirectiveFilter,
    ) -> Result<Vec<IncludeDirectiveRecord>>;
    /// Distinct (including project, included project) pairs, self-pairs included.
    fn dependency_pairs(&self) -> Result<Vec<(String, String)>>;
    fn stats(&self) -> Result<StoreStats>;

    /// The project adjacency mapping derived from the stored directives.
    fn project_dependency_tree(&self) -> Result<DependencyTree> {
        Ok(DependencyTree::from_pairs(self.dependency_pairs()?))
    }
}
