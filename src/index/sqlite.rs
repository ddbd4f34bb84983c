use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::{GraphError, Result};
use crate::index::schema::{CREATE_TABLES, DROP_TABLES};
use crate::index::{
    CodeFileRecord, DependencyStore, DirectiveFilter, IncludeDirectiveRecord, IncludeKind,
    ProjectRecord, StoreStats,
};

/// Location string that selects an in-memory database.
pub const MEMORY_LOCATION: &str = ":memory:";

pub struct SqliteStore {
    conn: Connection,
    location: String,
}

impl SqliteStore {
    /// Opens (or creates) the store at `location`, creating a missing parent
    /// directory first. `":memory:"` opens an in-memory store.
    pub fn open(location: &str) -> Result<Self> {
        if location == MEMORY_LOCATION {
            return Self::in_memory();
        }

        let path = Path::new(location);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tracing::info!("Making directory: {}", parent.display());
                std::fs::create_dir_all(parent).map_err(|e| GraphError::StoreOpen {
                    path: location.to_string(),
                    source: Box::new(e),
                })?;
            }
        }

        tracing::info!("Database filename: {}", location);
        let conn = Connection::open(path).map_err(|e| GraphError::StoreOpen {
            path: location.to_string(),
            source: Box::new(e),
        })?;
        Self::from_connection(conn, location)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| GraphError::StoreOpen {
            path: MEMORY_LOCATION.to_string(),
            source: Box::new(e),
        })?;
        Self::from_connection(conn, MEMORY_LOCATION)
    }

    fn from_connection(conn: Connection, location: &str) -> Result<Self> {
        Self::configure_pragmas(&conn)
            .and_then(|_| conn.execute_batch(CREATE_TABLES))
            .map_err(|e| GraphError::StoreOpen {
                path: location.to_string(),
                source: Box::new(e),
            })?;
        tracing::info!("Database opened.");

        Ok(Self {
            conn,
            location: location.to_string(),
        })
    }

    fn configure_pragmas(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;
            PRAGMA temp_store = MEMORY;
            "#,
        )
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_in_memory(&self) -> bool {
        self.location == MEMORY_LOCATION
    }

    /// True while a write batch is open.
    pub fn has_pending_batch(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Commits any pending batch and closes the connection.
    pub fn close(mut self) -> Result<()> {
        self.commit()?;
        self.conn.close().map_err(|(_, e)| GraphError::Database(e))?;
        tracing::info!("Database closed.");
        Ok(())
    }

    fn begin_batch(&self) -> Result<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    fn code_file_from_row(row: &rusqlite::Row) -> rusqlite::Result<CodeFileRecord> {
        Ok(CodeFileRecord {
            solution_path: row.get(0)?,
            project: row.get(1)?,
            filename: row.get(2)?,
        })
    }

    fn directive_from_row(row: &rusqlite::Row) -> rusqlite::Result<IncludeDirectiveRecord> {
        let kind: String = row.get(2)?;
        let kind = IncludeKind::from_str(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("unknown include type '{}'", kind).into(),
            )
        })?;
        Ok(IncludeDirectiveRecord {
            code_file: row.get(0)?,
            text: row.get(1)?,
            kind,
            filename: row.get(3)?,
            project: row.get(4)?,
            solution_path: row.get(5)?,
            line: row.get(6)?,
        })
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl DependencyStore for SqliteStore {
    fn reset(&mut self) -> Result<()> {
        self.begin_batch()?;
        self.conn.execute_batch(DROP_TABLES)?;
        self.conn.execute_batch(CREATE_TABLES)?;
        self.commit()
    }

    fn put_project(&mut self, project: &ProjectRecord) -> Result<()> {
        self.begin_batch()?;
        self.conn.execute(
            r#"
            INSERT INTO Project (SolutionPath, Name, HierarchyLevel)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(SolutionPath) DO UPDATE SET
                Name = excluded.Name,
                HierarchyLevel = excluded.HierarchyLevel
            "#,
            params![project.solution_path, project.name, project.hierarchy_level],
        )?;
        Ok(())
    }

    fn put_code_file(&mut self, file: &CodeFileRecord) -> Result<()> {
        self.begin_batch()?;
        self.conn.execute(
            r#"
            INSERT INTO CodeFile (SolutionPath, Project, Filename)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(SolutionPath) DO UPDATE SET
                Project = excluded.Project,
                Filename = excluded.Filename
            "#,
            params![file.solution_path, file.project, file.filename],
        )?;
        Ok(())
    }

    fn put_include_directive(&mut self, directive: &IncludeDirectiveRecord) -> Result<()> {
        self.begin_batch()?;
        self.conn.execute(
            r#"
            INSERT INTO IncludeDirective
            (CodeFileSolutionPath, IncludeText, IncludeType, IncludeFilename,
             IncludeProject, IncludeSolutionPath, LineNumber)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                directive.code_file,
                directive.text,
                directive.kind.as_str(),
                directive.filename,
                directive.project,
                directive.solution_path,
                directive.line,
            ],
        )?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
            tracing::info!("Database rolled back.");
        }
        Ok(())
    }

    fn projects(&self) -> Result<Vec<ProjectRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT SolutionPath, Name, HierarchyLevel FROM Project ORDER BY HierarchyLevel, Name",
        )?;
        let projects = stmt
            .query_map([], |row| {
                Ok(ProjectRecord {
                    solution_path: row.get(0)?,
                    name: row.get(1)?,
                    hierarchy_level: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    fn get_code_file(&self, solution_path: &str) -> Result<Option<CodeFileRecord>> {
        let file = self
            .conn
            .query_row(
                "SELECT SolutionPath, Project, Filename FROM CodeFile WHERE SolutionPath = ?1",
                params![solution_path],
                Self::code_file_from_row,
            )
            .optional()?;
        Ok(file)
    }

    fn code_files_ending_with(&self, suffix: &str) -> Result<Vec<CodeFileRecord>> {
        let pattern = format!("%{}", escape_like(suffix));
        let mut stmt = self.conn.prepare(
            r#"
            SELECT SolutionPath, Project, Filename FROM CodeFile
            WHERE SolutionPath LIKE ?1 ESCAPE '\'
            ORDER BY SolutionPath
            "#,
        )?;
        let files = stmt
            .query_map(params![pattern], Self::code_file_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    fn include_directives(
        &self,
        source_project: &str,
        filter: &DirectiveFilter,
    ) -> Result<Vec<IncludeDirectiveRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i.CodeFileSolutionPath, i.IncludeText, i.IncludeType, i.IncludeFilename,
                   i.IncludeProject, i.IncludeSolutionPath, i.LineNumber
            FROM IncludeDirective i
            INNER JOIN CodeFile c ON c.SolutionPath = i.CodeFileSolutionPath
            WHERE c.Project = ?1
              AND (?2 IS NULL OR i.IncludeType = ?2)
              AND (?3 IS NULL OR i.IncludeProject = ?3)
              AND (?4 = 0 OR i.IncludeSolutionPath IS NULL)
            ORDER BY i.CodeFileSolutionPath, i.LineNumber
            "#,
        )?;
        let directives = stmt
            .query_map(
                params![
                    source_project,
                    filter.kind.map(|k| k.as_str()),
                    filter.target_project,
                    filter.unresolved_only,
                ],
                Self::directive_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(directives)
    }

    fn dependency_pairs(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT c.Project AS Project, i.IncludeProject AS Dependency
            FROM CodeFile c
            INNER JOIN IncludeDirective i ON c.SolutionPath = i.CodeFileSolutionPath
            WHERE c.Project IS NOT NULL AND i.IncludeProject IS NOT NULL
            GROUP BY c.Project, i.IncludeProject
            ORDER BY c.Project, i.IncludeProject
            "#,
        )?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pairs)
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            projects: self.count("SELECT COUNT(*) FROM Project")?,
            code_files: self.count("SELECT COUNT(*) FROM CodeFile")?,
            attributed_files: self.count("SELECT COUNT(*) FROM CodeFile WHERE Project IS NOT NULL")?,
            include_directives: self.count("SELECT COUNT(*) FROM IncludeDirective")?,
            resolved_directives: self.count(
                "SELECT COUNT(*) FROM IncludeDirective WHERE IncludeSolutionPath IS NOT NULL",
            )?,
        })
    }
}
