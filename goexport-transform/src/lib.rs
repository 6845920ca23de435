//! goexport transform - promotes unexported Go declarations to exported form
//!
//! The crate turns one Go source file at a time into a tree of identifier
//! slots, renames lowercase-initial declarations and every same-file reference
//! to them, and prints the result back without touching any other text.
//!
//! Key pieces:
//! - [`syntax`]: tree-sitter backed parsing into a small typed tree
//! - [`engine`]: the two-phase rename engine
//! - [`printer`]: splice-based printing with an optional `gofmt` pass
//! - [`pipeline`]: per-file read, filter, rename, print and write

#![warn(clippy::all)]

pub mod engine;
pub mod filter;
pub mod names;
pub mod pipeline;
pub mod printer;
pub mod syntax;
pub mod types;

pub use engine::{Namespace, RenameEngine, RenameOutcome, RenameTable};
pub use pipeline::{FsWriter, Rewrite, Rewriter, SourceWriter};
pub use printer::{FormatFailure, Printer};
pub use syntax::{GoParser, SyntaxError, SyntaxTree};
pub use types::{FileOutcome, RewriteConfig, RunSummary};

use std::path::{Path, PathBuf};

/// Result type for rewrite operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Error types for rewrite operations. Per-file variants carry the path.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: SyntaxError },

    #[error("failed to format {}: {source}", path.display())]
    Format { path: PathBuf, source: FormatFailure },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Tree-sitter language error
    #[error("Language error: {0}")]
    Language(String),

    #[error("Configuration error: {0}")]
    Config(#[from] goexport_utils::UtilError),
}

impl TransformError {
    /// Pipeline stage that failed, as used in the per-file diagnostic
    pub fn stage(&self) -> &'static str {
        match self {
            TransformError::Read { .. } => "read",
            TransformError::Parse { .. } => "parse",
            TransformError::Format { .. } => "format",
            TransformError::Write { .. } => "write",
            TransformError::Language(_) => "load parser for",
            TransformError::Config(_) => "configure",
        }
    }

    /// File the error concerns, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            TransformError::Read { path, .. }
            | TransformError::Parse { path, .. }
            | TransformError::Format { path, .. }
            | TransformError::Write { path, .. } => Some(path),
            TransformError::Language(_) | TransformError::Config(_) => None,
        }
    }
}

impl From<tree_sitter::LanguageError> for TransformError {
    fn from(err: tree_sitter::LanguageError) -> Self {
        TransformError::Language(format!("{:?}", err))
    }
}
