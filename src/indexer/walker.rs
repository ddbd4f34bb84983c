use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::Diagnostic;
use crate::solution::paths;

/// A file reached by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as the filesystem returned it; this is what gets opened
    pub path: PathBuf,
    /// Normalized slash-separated form, lossy for non-UTF-8 names
    pub key: String,
}

/// Top-down traversal of a solution tree.
///
/// Entries are sorted by file name within each directory so the visiting
/// order does not depend on the platform. Symbolic links to files are
/// yielded like regular files; symbolic links to directories are not
/// descended into.
pub struct SourceWalker {
    root: String,
}

impl SourceWalker {
    pub fn new(root: &str) -> Self {
        Self {
            root: paths::normalize(root),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Files below the root in traversal order, produced lazily. Entries
    /// that cannot be read come out as an `UnreadableEntry` diagnostic.
    pub fn entries(&self) -> impl Iterator<Item = Result<SourceFile, Diagnostic>> + '_ {
        WalkDir::new(Path::new(&self.root))
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if is_source_file(&entry) => {
                    let key = paths::normalize(&paths::path_string(entry.path()));
                    Some(Ok(SourceFile {
                        path: entry.into_path(),
                        key,
                    }))
                }
                Ok(_) => None,
                Err(err) => {
                    let path = err
                        .path()
                        .map(paths::path_string)
                        .unwrap_or_else(|| self.root.clone());
                    Some(Err(Diagnostic::UnreadableEntry {
                        path,
                        message: err.to_string(),
                    }))
                }
            })
    }
}

fn is_source_file(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn walk(walker: &SourceWalker, diagnostics: &mut Diagnostics) -> Vec<String> {
        let mut files = Vec::new();
        for entry in walker.entries() {
            match entry {
                Ok(file) => files.push(file.key),
                Err(diagnostic) => diagnostics.report(diagnostic),
            }
        }
        files
    }

    #[test]
    fn test_walk_lists_files_only() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.c", "");
        create_file(temp_dir.path(), "sub/b.h", "");
        fs::create_dir_all(temp_dir.path().join("empty")).unwrap();

        let root = paths::path_string(temp_dir.path());
        let mut diagnostics = Diagnostics::new();
        let files = walk(&SourceWalker::new(&root), &mut diagnostics);

        assert_eq!(files, vec![format!("{}/a.c", root), format!("{}/sub/b.h", root)]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_walk_order_is_sorted_and_stable() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["zeta.c", "alpha.c", "mid/x.h", "beta.c"] {
            create_file(temp_dir.path(), name, "");
        }

        let root = paths::path_string(temp_dir.path());
        let walker = SourceWalker::new(&root);
        let first = walk(&walker, &mut Diagnostics::new());
        let second = walk(&walker, &mut Diagnostics::new());

        let names: Vec<_> = first.iter().map(|p| paths::relative(p, &root)).collect();
        assert_eq!(names, vec!["alpha.c", "beta.c", "mid/x.h", "zeta.c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let root = paths::path_string(&temp_dir.path().join("gone"));

        let mut diagnostics = Diagnostics::new();
        let files = walk(&SourceWalker::new(&root), &mut diagnostics);

        assert!(files.is_empty());
        assert_eq!(diagnostics.reports().len(), 1);
        assert!(matches!(
            diagnostics.reports()[0],
            Diagnostic::UnreadableEntry { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_symlinks_are_yielded_directory_symlinks_are_not_followed() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "shared/real.c", "");
        fs::create_dir_all(temp_dir.path().join("app")).unwrap();
        symlink(
            temp_dir.path().join("shared/real.c"),
            temp_dir.path().join("app/linked.c"),
        )
        .unwrap();
        symlink(
            temp_dir.path().join("shared"),
            temp_dir.path().join("app/shared_dir"),
        )
        .unwrap();
        symlink(
            temp_dir.path().join("shared/missing.c"),
            temp_dir.path().join("app/dangling.c"),
        )
        .unwrap();

        let root = paths::path_string(temp_dir.path());
        let mut diagnostics = Diagnostics::new();
        let files = walk(&SourceWalker::new(&root), &mut diagnostics);

        let names: Vec<_> = files.iter().map(|p| paths::relative(p, &root)).collect();
        assert_eq!(names, vec!["app/linked.c", "shared/real.c"]);
        assert!(diagnostics.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_keeps_openable_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.c");
        fs::write(temp_dir.path().join(name), "#include <x.h>\n").unwrap();

        let root = paths::path_string(temp_dir.path());
        let walker = SourceWalker::new(&root);
        let files: Vec<SourceFile> = walker.entries().map(|e| e.unwrap()).collect();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].key, format!("{}/caf\u{FFFD}.c", root));
        assert!(fs::read(&files[0].path).is_ok());
    }
}
