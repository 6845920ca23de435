//! Printing renamed trees back to source text
//!
//! Renaming only changes identifier spellings, so the tree is printed by
//! splicing the new spellings into the original text. The result is re-parsed
//! as a check and, when available, passed through `gofmt` for canonical layout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use crate::syntax::{GoParser, SyntaxError, SyntaxTree};

/// Why a renamed tree could not be turned into final text
#[derive(Debug, thiserror::Error)]
pub enum FormatFailure {
    #[error("renamed source no longer parses: {0}")]
    Reparse(#[from] SyntaxError),

    #[error("could not run gofmt: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("gofmt rejected the source: {0}")]
    Gofmt(String),

    #[error("gofmt produced non UTF-8 output")]
    Encoding,
}

/// Original text with every changed identifier slot replaced
pub fn splice(tree: &SyntaxTree) -> String {
    let source = tree.source();
    let mut edits: Vec<_> = tree
        .idents()
        .into_iter()
        .filter(|ident| ident.is_changed())
        .collect();
    edits.sort_by_key(|ident| ident.span().start);

    let mut out = String::with_capacity(source.len() + edits.len());
    let mut cursor = 0;
    for ident in edits {
        let span = ident.span();
        if span.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..span.start]);
        out.push_str(&ident.name);
        cursor = span.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Turns renamed trees into final source text
#[derive(Debug, Clone, Default)]
pub struct Printer {
    gofmt: Option<PathBuf>,
}

impl Printer {
    /// Create a printer, locating `gofmt` on `PATH` when requested
    pub fn new(use_gofmt: bool) -> Self {
        if !use_gofmt {
            return Self::default();
        }
        match which::which("gofmt") {
            Ok(path) => Self::with_gofmt(path),
            Err(err) => {
                warn!(error = %err, "gofmt not found, keeping original layout");
                Self::default()
            }
        }
    }

    /// Create a printer that formats through the given executable
    pub fn with_gofmt(path: PathBuf) -> Self {
        debug!(gofmt = %path.display(), "using external formatter");
        Self { gofmt: Some(path) }
    }

    pub fn uses_gofmt(&self) -> bool {
        self.gofmt.is_some()
    }

    /// Print a tree. Fails without producing any text if the result would not
    /// be valid source.
    pub fn print(&self, tree: &SyntaxTree, parser: &mut GoParser) -> Result<String, FormatFailure> {
        let text = splice(tree);
        parser.check(&text)?;

        match &self.gofmt {
            Some(gofmt) => run_gofmt(gofmt, text),
            None => Ok(text),
        }
    }
}

fn run_gofmt(gofmt: &Path, text: String) -> Result<String, FormatFailure> {
    let mut child = Command::new(gofmt)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Feed stdin from another thread so a full stdout pipe cannot stall us
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| FormatFailure::Gofmt("stdin unavailable".to_string()))?;
    let feeder = std::thread::spawn(move || stdin.write_all(text.as_bytes()));

    let output = child.wait_with_output()?;
    let fed = feeder
        .join()
        .map_err(|_| FormatFailure::Gofmt("stdin writer panicked".to_string()))?;

    // A formatter that exits early breaks the pipe; its status says more
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FormatFailure::Gofmt(stderr.trim().to_string()));
    }
    fed?;

    String::from_utf8(output.stdout).map_err(|_| FormatFailure::Encoding)
}
