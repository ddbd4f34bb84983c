//! Maps include text to a file on disk and to the project owning that file.

use std::path::Path;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::solution::{paths, ProjectRegistry};

/// A resolved include target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclude {
    /// Absolute, normalized path of the included file
    pub path: String,
    /// Project owning the included file
    pub project: Option<String>,
}

/// Resolves include text against the solution's search locations.
///
/// Search order, first hit wins:
/// 1. the directory of the including file
/// 2. the solution root
/// 3. every project include path, in registry order
///
/// When several include paths contain the text, the first one in registry
/// order is chosen and all candidates are reported as ambiguous.
pub struct IncludeResolver<'a> {
    registry: &'a ProjectRegistry,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(registry: &'a ProjectRegistry) -> Self {
        Self { registry }
    }

    /// Absolute path of the file `text` refers to when included from
    /// `including_file`, or `None` if no search location has it.
    pub fn resolve(
        &self,
        including_file: &str,
        text: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let sibling = paths::join(&paths::parent(including_file), text);
        if Path::new(&sibling).is_file() {
            return Some(sibling);
        }

        let from_root = paths::join(self.registry.solution_root(), text);
        if Path::new(&from_root).is_file() {
            return Some(from_root);
        }

        let candidates: Vec<String> = self
            .registry
            .projects()
            .iter()
            .filter_map(|project| project.include_path.as_deref())
            .map(|include_path| paths::join(include_path, text))
            .filter(|candidate| Path::new(candidate).is_file())
            .collect();

        if candidates.len() > 1 {
            diagnostics.report(Diagnostic::AmbiguousInclude {
                file: paths::normalize(including_file),
                text: text.to_string(),
                candidates: candidates.clone(),
            });
        }

        candidates.into_iter().next()
    }

    /// Resolves `text` and attributes the target to its owning project.
    pub fn resolve_target(
        &self,
        including_file: &str,
        text: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<ResolvedInclude> {
        self.resolve(including_file, text, diagnostics).map(|path| {
            let project = self.registry.resolve(&path).map(String::from);
            ResolvedInclude { path, project }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::Project;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    struct Fixture {
        _dir: TempDir,
        root: String,
        registry: ProjectRegistry,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = paths::path_string(dir.path());

        touch(dir.path(), "app/src/main.c");
        touch(dir.path(), "app/src/local.h");
        touch(dir.path(), "shared/top.h");
        touch(dir.path(), "alpha/include/config.h");
        touch(dir.path(), "alpha/include/alpha.h");
        touch(dir.path(), "beta/include/config.h");
        touch(dir.path(), "app/src/shared/top.h");

        let mut registry = ProjectRegistry::new(&root);
        registry.register(Project::new("App", "app")).unwrap();
        registry
            .register(Project::new("Alpha", "alpha").with_include_path("alpha/include"))
            .unwrap();
        registry
            .register(Project::new("Beta", "beta").with_include_path("beta/include"))
            .unwrap();

        Fixture {
            _dir: dir,
            root,
            registry,
        }
    }

    #[test]
    fn test_sibling_first() {
        let f = fixture();
        let resolver = IncludeResolver::new(&f.registry);
        let mut diagnostics = Diagnostics::new();
        let main = format!("{}/app/src/main.c", f.root);

        let resolved = resolver.resolve(&main, "local.h", &mut diagnostics);
        assert_eq!(resolved, Some(format!("{}/app/src/local.h", f.root)));

        // sibling beats the solution-root-relative file of the same text
        let resolved = resolver.resolve(&main, "shared/top.h", &mut diagnostics);
        assert_eq!(resolved, Some(format!("{}/app/src/shared/top.h", f.root)));
    }

    #[test]
    fn test_solution_root_second() {
        let f = fixture();
        let resolver = IncludeResolver::new(&f.registry);
        let mut diagnostics = Diagnostics::new();
        let other = format!("{}/alpha/src/impl.c", f.root);

        let resolved = resolver.resolve(&other, "shared/top.h", &mut diagnostics);
        assert_eq!(resolved, Some(format!("{}/shared/top.h", f.root)));
    }

    #[test]
    fn test_single_include_path_candidate() {
        let f = fixture();
        let resolver = IncludeResolver::new(&f.registry);
        let mut diagnostics = Diagnostics::new();
        let main = format!("{}/app/src/main.c", f.root);

        let target = resolver.resolve_target(&main, "alpha.h", &mut diagnostics).unwrap();
        assert_eq!(target.path, format!("{}/alpha/include/alpha.h", f.root));
        assert_eq!(target.project.as_deref(), Some("Alpha"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_ambiguous_picks_first_registered_and_reports_all() {
        let f = fixture();
        let resolver = IncludeResolver::new(&f.registry);
        let main = format!("{}/app/src/main.c", f.root);

        for _ in 0..3 {
            let mut diagnostics = Diagnostics::new();
            let target = resolver.resolve_target(&main, "config.h", &mut diagnostics).unwrap();
            assert_eq!(target.project.as_deref(), Some("Alpha"));

            let ambiguities: Vec<_> = diagnostics.ambiguities().collect();
            assert_eq!(ambiguities.len(), 1);
            match ambiguities[0] {
                Diagnostic::AmbiguousInclude { candidates, text, .. } => {
                    assert_eq!(text, "config.h");
                    assert_eq!(
                        candidates,
                        &vec![
                            format!("{}/alpha/include/config.h", f.root),
                            format!("{}/beta/include/config.h", f.root),
                        ]
                    );
                }
                other => panic!("unexpected diagnostic {:?}", other),
            }
        }
    }

    #[test]
    fn test_unresolvable_is_silent() {
        let f = fixture();
        let resolver = IncludeResolver::new(&f.registry);
        let mut diagnostics = Diagnostics::new();
        let main = format!("{}/app/src/main.c", f.root);

        assert!(resolver.resolve_target(&main, "stdio.h", &mut diagnostics).is_none());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_directories_do_not_resolve() {
        let f = fixture();
        let resolver = IncludeResolver::new(&f.registry);
        let mut diagnostics = Diagnostics::new();
        let main = format!("{}/app/src/main.c", f.root);

        assert!(resolver.resolve(&main, "shared", &mut diagnostics).is_none());
    }

    #[test]
    fn test_parent_relative_text() {
        let f = fixture();
        let resolver = IncludeResolver::new(&f.registry);
        let mut diagnostics = Diagnostics::new();
        let main = format!("{}/app/src/main.c", f.root);

        let target = resolver
            .resolve_target(&main, "../../alpha/include/alpha.h", &mut diagnostics)
            .unwrap();
        assert_eq!(target.path, format!("{}/alpha/include/alpha.h", f.root));
        assert_eq!(target.project.as_deref(), Some("Alpha"));
    }
}
