pub mod filter;
pub mod processor;
pub mod resolver;
pub mod scanner;
pub mod walker;

pub use filter::{FileFilter, DEFAULT_EXCLUDE_PATTERNS, DEFAULT_INCLUDE_PATTERNS};
pub use processor::{ScanOptions, ScanSummary, SolutionScanner, DEFAULT_COMMIT_INTERVAL};
pub use resolver::{IncludeResolver, ResolvedInclude};
pub use scanner::{parse_line, scan_file, scan_reader, IncludeText, ScannedIncludes};
pub use walker::{SourceFile, SourceWalker};
