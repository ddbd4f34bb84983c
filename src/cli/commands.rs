use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use include_graph::config::{Overrides, Settings, Solution, DEFAULT_CONFIG_FILE};
use include_graph::diagnostics::Diagnostics;
use include_graph::error::{GraphError, Result};
use include_graph::graph::{evaluate_selectors, ProjectSelector};
use include_graph::index::sqlite::{SqliteStore, MEMORY_LOCATION};
use include_graph::index::{DependencyStore, DirectiveFilter, IncludeKind};
use include_graph::indexer::{ScanOptions, ScanSummary, SolutionScanner};
use include_graph::render;

use super::progress;

#[derive(Parser)]
#[command(name = "include-graph")]
#[command(about = "Builds a project dependency graph from the #include directives of a C/C++ source tree")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Write a starting configuration
    include-graph example-config > include-graph.toml

    # Scan the source tree into the configured store
    include-graph scan

    # All projects Third depends on, directly or not
    include-graph deps -p Third

    # Direct dependencies only, as JSON
    include-graph deps -p Third --direct --format json

    # Top-level projects as a dot graph, reusing the last scan
    include-graph deps -p '^' --dot --reuse-database

    # Group hints to pass back with --dot-config
    include-graph deps -p '?' --dot --example-dot-config > groups.dot

    # Which directives make App depend on Core
    include-graph includes App --target Core
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: include-graph.toml in the working directory)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Store location, overriding the configuration file
    #[arg(short = 'f', long, global = true)]
    pub database: Option<String>,

    /// Root of the source tree, overriding the configuration file
    #[arg(short = 's', long, global = true)]
    pub source_path: Option<PathBuf>,

    /// Print progress and status messages
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Print debug messages
    #[arg(long, global = true)]
    pub debug: bool,

    /// Don't print any diagnostics
    #[arg(long, global = true)]
    pub silence_errors: bool,
}

impl Cli {
    /// Log filter directive for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        if self.silence_errors {
            "off"
        } else if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }

    pub fn context(&self) -> Context {
        Context {
            config: self.config.clone(),
            overrides: Overrides {
                database: self.database.clone(),
                source_path: self.source_path.clone(),
            },
            quiet: self.silence_errors,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the source tree and populate the store
    Scan,

    /// Print project dependencies
    Deps {
        /// Project name, or `?` (all), `^` (top-level), `~` (no dependencies).
        /// Repeat to combine results.
        #[arg(short = 'p', long = "project", required = true)]
        projects: Vec<String>,

        /// Only direct dependencies
        #[arg(short = 'd', long)]
        direct: bool,

        /// Use the existing store file instead of scanning again
        #[arg(short = 'r', long)]
        reuse_database: bool,

        /// Output format for the plain listing
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Print a dot graph
        #[arg(long)]
        dot: bool,

        /// File copied into the dot graph before the edges
        #[arg(long, requires = "dot")]
        dot_config: Option<PathBuf>,

        /// Print example dot group hints instead of the graph
        #[arg(long, requires = "dot")]
        example_dot_config: bool,
    },

    /// List the include directives of a project's files
    Includes {
        /// Project whose files are listed
        project: String,

        /// Only directives resolving into this project
        #[arg(long)]
        target: Option<String>,

        /// Only local or only system includes
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Only directives that resolve to no file
        #[arg(long)]
        unresolved: bool,
    },

    /// Show store statistics
    Stats,

    /// Print an example configuration file
    ExampleConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Local,
    System,
}

impl From<KindArg> for IncludeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Local => IncludeKind::Local,
            KindArg::System => IncludeKind::System,
        }
    }
}

/// Global options shared by every command.
pub struct Context {
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
    pub quiet: bool,
}

impl Context {
    /// Loads the configuration file and builds the solution from it. Without
    /// an explicit `--config`, a missing default file means default settings.
    pub fn solution(&self, diagnostics: &mut Diagnostics) -> Result<Solution> {
        let (settings, config_dir) = match &self.config {
            Some(path) => (Settings::load(path)?, config_dir(path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    (Settings::load(path)?, PathBuf::from("."))
                } else {
                    tracing::warn!(
                        "No {} found; using default settings without projects",
                        DEFAULT_CONFIG_FILE
                    );
                    (Settings::default(), PathBuf::from("."))
                }
            }
        };

        settings.into_solution(&config_dir, &self.overrides, diagnostics)
    }
}

fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True if the solution's store is a file that already exists.
fn store_exists(solution: &Solution) -> bool {
    !solution.database.is_empty()
        && solution.database != MEMORY_LOCATION
        && Path::new(&solution.database).is_file()
}

/// Opens the solution's store. An existing store file is used as-is when
/// `reuse` is set; otherwise (or for an in-memory store) the tree is scanned.
fn open_store(
    ctx: &Context,
    solution: &Solution,
    reuse: bool,
    diagnostics: &mut Diagnostics,
) -> Result<SqliteStore> {
    let existing = store_exists(solution);

    let mut store = SqliteStore::open(&solution.database)?;
    if reuse && existing {
        tracing::info!("Reusing database {}", solution.database);
    } else {
        run_scan(ctx, solution, &mut store, diagnostics)?;
    }
    Ok(store)
}

fn run_scan(
    ctx: &Context,
    solution: &Solution,
    store: &mut SqliteStore,
    diagnostics: &mut Diagnostics,
) -> Result<ScanSummary> {
    let spinner = progress::spinner(
        &format!("Scanning {}", solution.registry.solution_root()),
        ctx.quiet,
    );
    let result = SolutionScanner::new(&solution.registry, &solution.filter)
        .with_options(ScanOptions {
            commit_interval: solution.commit_interval,
        })
        .scan(store, diagnostics);
    progress::finish_spinner(spinner);
    result
}

pub fn scan(ctx: &Context) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let solution = ctx.solution(&mut diagnostics)?;
    let mut store = SqliteStore::open(&solution.database)?;

    let summary = run_scan(ctx, &solution, &mut store, &mut diagnostics)?;

    println!(
        "Processed {} files, skipped {} files",
        summary.processed, summary.skipped
    );
    println!(
        "Recorded {} include directives, {} resolved",
        summary.directives, summary.resolved
    );
    let ambiguities = diagnostics.ambiguities().count();
    if ambiguities > 0 {
        println!("{} ambiguous includes (first candidate selected)", ambiguities);
    }
    if store.is_in_memory() {
        println!("Store is in memory; results are discarded on exit");
    }
    println!("Finished in {:.2}s", diagnostics.elapsed().as_secs_f64());

    store.close()
}

pub struct DepsArgs<'a> {
    pub projects: &'a [String],
    pub direct: bool,
    pub reuse_database: bool,
    pub format: OutputFormat,
    pub dot: bool,
    pub dot_config: Option<&'a Path>,
    pub example_dot_config: bool,
}

pub fn deps(ctx: &Context, args: DepsArgs<'_>) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let solution = ctx.solution(&mut diagnostics)?;
    let store = open_store(ctx, &solution, args.reuse_database, &mut diagnostics)?;

    let tree = store.project_dependency_tree()?;
    let selectors: Vec<ProjectSelector> = args
        .projects
        .iter()
        .filter_map(|p| p.parse().ok())
        .collect();
    let result = evaluate_selectors(&selectors, &tree, args.direct, &mut diagnostics);

    if args.dot && args.example_dot_config {
        print!("{}", render::render_group_hints(&result, &solution.groups));
    } else if args.dot {
        let preamble = match args.dot_config {
            Some(path) => Some(fs::read_to_string(path).map_err(|source| GraphError::ConfigRead {
                path: path.display().to_string(),
                source,
            })?),
            None => None,
        };
        print!(
            "{}",
            render::render_dot(&tree, &selectors, &result, preamble.as_deref())
        );
    } else {
        match args.format {
            OutputFormat::Text => print!("{}", render::render_list(&result)),
            OutputFormat::Json => println!("{}", render::render_json(&result)?),
        }
    }

    tracing::info!("Finished.");
    store.close()
}

pub fn includes(
    ctx: &Context,
    project: &str,
    target: Option<String>,
    kind: Option<KindArg>,
    unresolved: bool,
) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let solution = ctx.solution(&mut diagnostics)?;
    let store = open_store(ctx, &solution, true, &mut diagnostics)?;

    let filter = DirectiveFilter {
        kind: kind.map(IncludeKind::from),
        target_project: target,
        unresolved_only: unresolved,
    };
    let directives = store.include_directives(project, &filter)?;

    if directives.is_empty() {
        println!("No include directives found for {}", project);
    }
    for directive in &directives {
        let (open, close) = match directive.kind {
            IncludeKind::Local => ('"', '"'),
            IncludeKind::System => ('<', '>'),
        };
        match (&directive.solution_path, &directive.project) {
            (Some(path), Some(owner)) => println!(
                "{}:{}: {}{}{} -> {} [{}]",
                directive.code_file, directive.line, open, directive.text, close, path, owner
            ),
            (Some(path), None) => println!(
                "{}:{}: {}{}{} -> {}",
                directive.code_file, directive.line, open, directive.text, close, path
            ),
            (None, _) => println!(
                "{}:{}: {}{}{} (unresolved)",
                directive.code_file, directive.line, open, directive.text, close
            ),
        }
    }

    store.close()
}

pub fn stats(ctx: &Context) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let solution = ctx.solution(&mut diagnostics)?;
    if !store_exists(&solution) {
        return Err(GraphError::MissingStore {
            path: solution.database,
        });
    }
    let store = SqliteStore::open(&solution.database)?;
    let stats = store.stats()?;

    println!("Store Statistics:");
    println!("  Projects: {}", stats.projects);
    println!(
        "  Code files: {} ({} in a project)",
        stats.code_files, stats.attributed_files
    );
    println!(
        "  Include directives: {} ({} resolved)",
        stats.include_directives, stats.resolved_directives
    );

    let projects = store.projects()?;
    if !projects.is_empty() {
        println!("\n  Projects by hierarchy level:");
        for project in &projects {
            println!(
                "    {}: {} ({})",
                project.hierarchy_level, project.name, project.solution_path
            );
        }
    }

    store.close()
}

pub fn example_config() -> Result<()> {
    print!("{}", Settings::example());
    Ok(())
}
