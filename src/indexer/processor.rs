//! The scan driver: walk, filter, extract, resolve and persist.

use std::time::Instant;

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::index::{
    CodeFileRecord, DependencyStore, IncludeDirectiveRecord, IncludeKind, ProjectRecord,
};
use crate::indexer::filter::FileFilter;
use crate::indexer::resolver::IncludeResolver;
use crate::indexer::scanner::{self, IncludeText};
use crate::indexer::walker::{SourceFile, SourceWalker};
use crate::solution::{paths, ProjectRegistry};

pub const DEFAULT_COMMIT_INTERVAL: usize = 1000;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Processed files between two store commits
    pub commit_interval: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            commit_interval: DEFAULT_COMMIT_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub processed: usize,
    pub skipped: usize,
    pub directives: usize,
    pub resolved: usize,
    pub elapsed_ms: u64,
}

/// Populates a [`DependencyStore`] from the files of one solution.
pub struct SolutionScanner<'a> {
    registry: &'a ProjectRegistry,
    filter: &'a FileFilter,
    options: ScanOptions,
}

impl<'a> SolutionScanner<'a> {
    pub fn new(registry: &'a ProjectRegistry, filter: &'a FileFilter) -> Self {
        Self {
            registry,
            filter,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Resets the store and fills it from scratch. On a fatal error the
    /// in-flight batch is rolled back before the error is returned; batches
    /// committed earlier stay in the store.
    pub fn scan(
        &self,
        store: &mut dyn DependencyStore,
        diagnostics: &mut Diagnostics,
    ) -> Result<ScanSummary> {
        match self.populate(store, diagnostics) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                if let Err(rollback) = store.abort() {
                    tracing::warn!("Rollback after failed scan also failed: {}", rollback);
                }
                Err(err)
            }
        }
    }

    fn populate(
        &self,
        store: &mut dyn DependencyStore,
        diagnostics: &mut Diagnostics,
    ) -> Result<ScanSummary> {
        let started_at = Instant::now();
        tracing::info!("Source path: {}", self.registry.solution_root());

        store.reset()?;
        for project in self.registry.projects() {
            store.put_project(&ProjectRecord {
                solution_path: self.registry.relative_path(&project.root),
                name: project.name.clone(),
                hierarchy_level: project.rank as i64,
            })?;
        }

        let resolver = IncludeResolver::new(self.registry);
        let interval = self.options.commit_interval.max(1);
        let mut summary = ScanSummary::default();

        let walker = SourceWalker::new(self.registry.solution_root());
        for entry in walker.entries() {
            let file = match entry {
                Ok(file) => file,
                Err(diagnostic) => {
                    diagnostics.report(diagnostic);
                    continue;
                }
            };
            if !self.filter.accepts(&file.key) {
                summary.skipped += 1;
                continue;
            }

            self.process_file(store, &resolver, &file, &mut summary, diagnostics)?;
            summary.processed += 1;

            if summary.processed % interval == 0 {
                store.commit()?;
                log_progress(&summary);
            }
        }

        store.commit()?;
        log_progress(&summary);

        summary.elapsed_ms = started_at.elapsed().as_millis() as u64;
        Ok(summary)
    }

    fn process_file(
        &self,
        store: &mut dyn DependencyStore,
        resolver: &IncludeResolver<'_>,
        file: &SourceFile,
        summary: &mut ScanSummary,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let solution_path = self.registry.relative_path(&file.key);
        store.put_code_file(&CodeFileRecord {
            solution_path: solution_path.clone(),
            project: self.registry.resolve(&file.key).map(String::from),
            filename: paths::file_name(&file.key).to_string(),
        })?;

        let includes = scanner::scan_file(&file.path)?;
        tracing::debug!("{}: {} includes", solution_path, includes.len());

        let kinds = [
            (IncludeKind::Local, &includes.local),
            (IncludeKind::System, &includes.system),
        ];
        for (kind, found) in kinds {
            for include in found {
                let record = self.directive(
                    resolver,
                    &file.key,
                    &solution_path,
                    kind,
                    include,
                    diagnostics,
                );
                if record.is_resolved() {
                    summary.resolved += 1;
                }
                store.put_include_directive(&record)?;
                summary.directives += 1;
            }
        }

        Ok(())
    }

    fn directive(
        &self,
        resolver: &IncludeResolver<'_>,
        file: &str,
        solution_path: &str,
        kind: IncludeKind,
        include: &IncludeText,
        diagnostics: &mut Diagnostics,
    ) -> IncludeDirectiveRecord {
        let text = if include.text.contains('\\') {
            diagnostics.report(Diagnostic::NonPosixInclude {
                file: solution_path.to_string(),
                text: include.text.clone(),
            });
            paths::to_slash(&include.text)
        } else {
            include.text.clone()
        };

        let target = resolver.resolve_target(file, &text, diagnostics);

        IncludeDirectiveRecord {
            code_file: solution_path.to_string(),
            filename: paths::file_name(&text).to_string(),
            kind,
            project: target.as_ref().and_then(|t| t.project.clone()),
            solution_path: target.map(|t| self.registry.relative_path(&t.path)),
            line: include.line,
            text,
        }
    }
}

fn log_progress(summary: &ScanSummary) {
    tracing::info!(
        "Processed {:>4}, skipped {:>6} files",
        summary.processed,
        summary.skipped
    );
}
