//! Table definitions of the dependency store.
//!
//! `IncludeDirective` has no primary key: scanning the same file twice
//! without a reset stores its directives twice.

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS Project (
    SolutionPath TEXT PRIMARY KEY,
    Name TEXT,
    HierarchyLevel INTEGER
);

CREATE TABLE IF NOT EXISTS CodeFile (
    SolutionPath TEXT PRIMARY KEY,
    Project TEXT,
    Filename TEXT
);

CREATE TABLE IF NOT EXISTS IncludeDirective (
    CodeFileSolutionPath TEXT,
    IncludeText TEXT,
    IncludeType TEXT,
    IncludeFilename TEXT,
    IncludeProject TEXT,
    IncludeSolutionPath TEXT,
    LineNumber INTEGER
);

CREATE INDEX IF NOT EXISTS idx_include_code_file ON IncludeDirective(CodeFileSolutionPath);
CREATE INDEX IF NOT EXISTS idx_include_project ON IncludeDirective(IncludeProject);
CREATE INDEX IF NOT EXISTS idx_code_file_project ON CodeFile(Project);
"#;

pub const DROP_TABLES: &str = r#"
DROP TABLE IF EXISTS Project;
DROP TABLE IF EXISTS CodeFile;
DROP TABLE IF EXISTS IncludeDirective;
"#;
